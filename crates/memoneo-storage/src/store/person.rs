//! Person and selection type reducers

use std::collections::BTreeMap;

use memoneo_core::{
    EntityId, Person, PersonRequest, PersonResponse, SelectionType, SelectionTypeRequest,
    SelectionTypeResponse,
};

use super::RequestStatus;

/// Persons sorted by surname, then name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonSlice {
    pub persons: Vec<Person>,
    pub fetch: RequestStatus,
    pub create: RequestStatus,
    pub delete: RequestStatus,
}

impl PersonSlice {
    pub fn contains(&self, id: &EntityId) -> bool {
        self.persons.iter().any(|p| &p.id == id)
    }

    pub(super) fn begin(&mut self, request: &PersonRequest) {
        match request {
            PersonRequest::Fetch => self.fetch.start(),
            PersonRequest::Create { .. } => self.create.start(),
            PersonRequest::Delete { .. } => self.delete.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &PersonResponse) {
        match response {
            PersonResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(persons) = outcome {
                    self.persons = persons.clone();
                    self.sort();
                }
            }
            PersonResponse::Created(outcome) => {
                self.create.finish(outcome);
                if let Ok(person) = outcome {
                    self.persons.retain(|p| p.id != person.id);
                    self.persons.push(person.clone());
                    self.sort();
                }
            }
            PersonResponse::Deleted(outcome) => {
                self.delete.finish(outcome);
                if let Ok(id) = outcome {
                    self.persons.retain(|p| &p.id != id);
                }
            }
        }
    }

    fn sort(&mut self) {
        self.persons
            .sort_by(|a, b| a.surname.cmp(&b.surname).then_with(|| a.name.cmp(&b.name)));
    }
}

/// Live selection types by id, each holding only its active items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionTypeSlice {
    pub selection_types: BTreeMap<EntityId, SelectionType>,
    pub fetch: RequestStatus,
    pub create: RequestStatus,
    pub add_item: RequestStatus,
    pub delete_item: RequestStatus,
}

impl SelectionTypeSlice {
    pub fn get(&self, id: &EntityId) -> Option<&SelectionType> {
        self.selection_types.get(id)
    }

    pub(super) fn begin(&mut self, request: &SelectionTypeRequest) {
        match request {
            SelectionTypeRequest::Fetch | SelectionTypeRequest::FetchOne { .. } => {
                self.fetch.start()
            }
            SelectionTypeRequest::Create { .. } => self.create.start(),
            SelectionTypeRequest::AddItem { .. } => self.add_item.start(),
            SelectionTypeRequest::DeleteItem { .. } => self.delete_item.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &SelectionTypeResponse) {
        match response {
            SelectionTypeResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(selection_types) = outcome {
                    self.selection_types.clear();
                    for selection_type in selection_types {
                        self.upsert(selection_type);
                    }
                }
            }
            SelectionTypeResponse::FetchedOne(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(selection_type) = outcome {
                    self.upsert(selection_type);
                }
            }
            SelectionTypeResponse::Created(outcome) => {
                self.create.finish(outcome);
                if let Ok(selection_type) = outcome {
                    self.upsert(selection_type);
                }
            }
            SelectionTypeResponse::ItemAdded(outcome) => {
                self.add_item.finish(outcome);
                if let Ok(selection_type) = outcome {
                    self.upsert(selection_type);
                }
            }
            SelectionTypeResponse::ItemDeleted(outcome) => {
                self.delete_item.finish(outcome);
                if let Ok(selection_type) = outcome {
                    self.upsert(selection_type);
                }
            }
        }
    }

    /// Deleted selection types are dropped rather than stored
    fn upsert(&mut self, selection_type: &SelectionType) {
        if selection_type.deleted {
            self.selection_types.remove(&selection_type.id);
            return;
        }
        let mut selection_type = selection_type.clone();
        selection_type.retain_active_items();
        self.selection_types
            .insert(selection_type.id.clone(), selection_type);
    }
}
