//! Auth, encryption key, user and recovery reducers

use memoneo_core::{
    AuthRequest, AuthResponse, KeyRequest, KeyResponse, RecoveryRequest, RecoveryResponse, User,
    UserRequest, UserResponse,
};

use super::RequestStatus;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSlice {
    pub authenticated: bool,
    pub login: RequestStatus,
    pub register: RequestStatus,
    pub auto_login: RequestStatus,
    pub logout: RequestStatus,
}

impl AuthSlice {
    pub(super) fn begin(&mut self, request: &AuthRequest) {
        match request {
            AuthRequest::Login { .. } => self.login.start(),
            AuthRequest::Register { .. } => self.register.start(),
            AuthRequest::AutoLogin => self.auto_login.start(),
            AuthRequest::Logout => self.logout.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &AuthResponse) {
        match response {
            // A rejected login or register never touches the stored token,
            // so an existing session stays signed in
            AuthResponse::LoggedIn(outcome) => {
                self.login.finish(outcome);
                self.authenticated |= outcome.is_ok();
            }
            AuthResponse::Registered(outcome) => {
                self.register.finish(outcome);
                self.authenticated |= outcome.is_ok();
            }
            AuthResponse::AutoLoggedIn(outcome) => {
                self.auto_login.finish(outcome);
                self.authenticated = outcome.is_ok();
            }
            AuthResponse::LoggedOut(outcome) => {
                self.logout.finish(outcome);
                if outcome.is_ok() {
                    self.authenticated = false;
                }
            }
        }
    }
}

/// Whether a content passphrase exists; never the passphrase itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySlice {
    pub initialized: bool,
    pub retrieve: RequestStatus,
    pub init: RequestStatus,
}

impl KeySlice {
    pub(super) fn begin(&mut self, request: &KeyRequest) {
        match request {
            KeyRequest::Retrieve => self.retrieve.start(),
            KeyRequest::Init { .. } => self.init.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &KeyResponse) {
        match response {
            KeyResponse::Retrieved(outcome) => {
                self.retrieve.finish(outcome);
                if let Ok(present) = outcome {
                    self.initialized = *present;
                }
            }
            KeyResponse::Initialized(outcome) => {
                self.init.finish(outcome);
                if outcome.is_ok() {
                    self.initialized = true;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSlice {
    pub user: Option<User>,
    pub fetch: RequestStatus,
    pub change_mail: RequestStatus,
}

impl UserSlice {
    pub(super) fn begin(&mut self, request: &UserRequest) {
        match request {
            UserRequest::Fetch => self.fetch.start(),
            UserRequest::ChangeMail { .. } => self.change_mail.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &UserResponse) {
        match response {
            UserResponse::Fetched(outcome) => {
                self.fetch.finish(outcome);
                if let Ok(user) = outcome {
                    self.user = Some(user.clone());
                }
            }
            UserResponse::MailChanged(outcome) => {
                self.change_mail.finish(outcome);
                if let (Ok(mail), Some(user)) = (outcome, self.user.as_mut()) {
                    user.mail = mail.clone();
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoverySlice {
    pub code_requested: bool,
    pub code_verified: bool,
    pub request_code: RequestStatus,
    pub verify_code: RequestStatus,
}

impl RecoverySlice {
    pub(super) fn begin(&mut self, request: &RecoveryRequest) {
        match request {
            RecoveryRequest::RequestCode { .. } => self.request_code.start(),
            RecoveryRequest::VerifyCode { .. } => self.verify_code.start(),
        }
    }

    pub(super) fn apply(&mut self, response: &RecoveryResponse) {
        match response {
            RecoveryResponse::CodeRequested(outcome) => {
                self.request_code.finish(outcome);
                self.code_requested = outcome.is_ok();
                self.code_verified = false;
            }
            RecoveryResponse::CodeVerified(outcome) => {
                self.verify_code.finish(outcome);
                self.code_verified = outcome.is_ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoneo_core::{Failure, FailureKind};

    #[test]
    fn test_auto_login_failure_clears_authentication() {
        let mut slice = AuthSlice::default();
        slice.apply(&AuthResponse::LoggedIn(Ok(())));
        assert!(slice.authenticated);

        slice.apply(&AuthResponse::AutoLoggedIn(Err(Failure::new(
            FailureKind::AuthMissing,
            "No auth token stored",
        ))));
        assert!(!slice.authenticated);
        assert!(slice.auto_login.error.is_some());
    }

    #[test]
    fn test_failed_relogin_keeps_session() {
        let mut slice = AuthSlice::default();
        slice.apply(&AuthResponse::LoggedIn(Err(Failure::new(
            FailureKind::Network,
            "Wrong password",
        ))));
        assert!(!slice.authenticated);

        slice.apply(&AuthResponse::LoggedIn(Ok(())));
        slice.apply(&AuthResponse::LoggedIn(Err(Failure::new(
            FailureKind::Network,
            "Wrong password",
        ))));
        assert!(slice.authenticated);
        assert_eq!(slice.login.error.as_deref(), Some("Wrong password"));
    }

    #[test]
    fn test_key_initialized_flag() {
        let mut slice = KeySlice::default();
        slice.apply(&KeyResponse::Retrieved(Ok(false)));
        assert!(!slice.initialized);
        slice.apply(&KeyResponse::Initialized(Ok(())));
        assert!(slice.initialized);
    }

    #[test]
    fn test_mail_change_updates_user() {
        let mut slice = UserSlice::default();
        slice.apply(&UserResponse::Fetched(Ok(User {
            id: "u".into(),
            name: "Kim".to_string(),
            mail: "old@example.org".to_string(),
        })));
        slice.apply(&UserResponse::MailChanged(Ok("new@example.org".to_string())));
        assert_eq!(slice.user.unwrap().mail, "new@example.org");
    }
}
