//! Auth service
//!
//! Tracks who owns the journal on this device. A device starts `Unknown`,
//! becomes `Guest` when the user skips login or saves a first record, and
//! becomes `Authenticated` after a successful login. The first login of a
//! guest who already has records passes through `Migrating` while those
//! records move to the new account.

use crate::database::{LinkedAccount, Repository, User};
use crate::error::{AuthError, Result};
use crate::providers::{AuthProvider, Credentials, LoginProvider, ProviderIdentity};
use crate::services::session::SessionStore;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    Unknown,
    Guest,
    Migrating,
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Why the app is asking whether registration is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationTrigger {
    /// The guest has saved this many records
    RecordCount(u64),
    CapsuleCreation,
    CloudSync,
    AiFeature,
    SocialFeature,
    ProUpgrade,
}

impl RegistrationTrigger {
    /// Features that always need an account
    pub fn is_gated_feature(&self) -> bool {
        !matches!(self, RegistrationTrigger::RecordCount(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MigrationOutcome {
    NotNeeded,
    Migrated { records: u64 },
    Failed { reason: String },
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub user: User,
    pub migration: MigrationOutcome,
}

/// Moves a guest's records to a freshly signed-in account
#[async_trait]
pub trait GuestMigrator: Send + Sync {
    async fn migrate(&self, guest_id: &str, user: &User) -> Result<u64>;
}

/// Reassigns guest-owned rows in the local database
#[derive(Clone)]
pub struct LocalRecordMigrator {
    repo: Repository,
}

impl LocalRecordMigrator {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl GuestMigrator for LocalRecordMigrator {
    async fn migrate(&self, guest_id: &str, user: &User) -> Result<u64> {
        self.repo.reassign_owner(guest_id, &user.id).await
    }
}

struct AuthInner {
    session: SessionStore,
    providers: HashMap<LoginProvider, Arc<dyn AuthProvider>>,
    migrator: Arc<dyn GuestMigrator>,
    record_threshold: u64,
    state: watch::Sender<AuthState>,
    /// Serializes state transitions
    transition: Mutex<()>,
}

#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthInner>,
}

impl AuthService {
    pub fn new(
        session: SessionStore,
        providers: Vec<Arc<dyn AuthProvider>>,
        migrator: Arc<dyn GuestMigrator>,
        record_threshold: u64,
    ) -> Self {
        let providers = providers
            .into_iter()
            .map(|p| (p.provider(), p))
            .collect();
        let (state, _) = watch::channel(AuthState::Unknown);

        Self {
            inner: Arc::new(AuthInner {
                session,
                providers,
                migrator,
                record_threshold,
                state,
                transition: Mutex::new(()),
            }),
        }
    }

    pub fn current_state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.inner.state.borrow() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, state: AuthState) {
        tracing::debug!("Auth state -> {:?}", state);
        self.inner.state.send_replace(state);
    }

    /// Pick up the persisted session at startup
    pub async fn restore(&self) -> Result<AuthState> {
        let _guard = self.inner.transition.lock().await;

        let state = if let Some(user) = self.inner.session.load_user().await? {
            tracing::info!("Restored session for user {}", user.id);
            AuthState::Authenticated(user)
        } else if self.inner.session.guest_device_id().await?.is_some() {
            AuthState::Guest
        } else {
            AuthState::Unknown
        };

        self.set_state(state.clone());
        Ok(state)
    }

    /// Sign in with a provider.
    ///
    /// A failed sign-in leaves the previous state and persisted user as they
    /// were. Once the provider accepts, the call always ends `Authenticated`;
    /// the outcome of moving guest records is reported in the result.
    pub async fn login_with(
        &self,
        provider: LoginProvider,
        credentials: Credentials,
    ) -> Result<LoginOutcome> {
        let _guard = self.inner.transition.lock().await;

        tracing::info!("Logging in with {}", provider.as_str());

        if credentials.provider() != provider {
            return Err(AuthError::InvalidCredentials {
                provider,
                reason: format!("credentials are for {}", credentials.provider()),
            }
            .into());
        }
        credentials.validate()?;

        let auth_provider = self
            .inner
            .providers
            .get(&provider)
            .ok_or(AuthError::ProviderNotConfigured(provider))?;

        let identity = auth_provider.authenticate(&credentials).await.map_err(|e| {
            tracing::warn!("Login with {} failed: {}", provider.as_str(), e);
            e
        })?;

        let user = self.user_for_identity(identity).await?;
        let was_authenticated = self.is_authenticated();
        let local_count = self.inner.session.local_record_count().await?;
        self.inner.session.save_user(&user).await?;

        let migration = if !was_authenticated && local_count > 0 {
            self.set_state(AuthState::Migrating);
            self.migrate_guest_records(&user).await
        } else {
            MigrationOutcome::NotNeeded
        };

        self.set_state(AuthState::Authenticated(user.clone()));
        tracing::info!("User {} logged in", user.id);

        Ok(LoginOutcome { user, migration })
    }

    async fn migrate_guest_records(&self, user: &User) -> MigrationOutcome {
        let guest_id = match self.inner.session.guest_device_id().await {
            Ok(Some(id)) => id,
            Ok(None) => return MigrationOutcome::NotNeeded,
            Err(e) => {
                tracing::warn!("Guest migration skipped, guest id unreadable: {}", e);
                return MigrationOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match self.inner.migrator.migrate(&guest_id, user).await {
            Ok(records) => {
                tracing::info!("Migrated {} guest records to {}", records, user.id);
                MigrationOutcome::Migrated { records }
            }
            Err(e) => {
                tracing::warn!("Guest migration to {} failed: {}", user.id, e);
                MigrationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Build the account for a provider identity, keeping an existing
    /// profile when the same account signs in again
    async fn user_for_identity(&self, identity: ProviderIdentity) -> Result<User> {
        let id = account_id(identity.provider, &identity.subject);

        if let Some(existing) = self.inner.session.load_user().await? {
            if existing.id == id {
                return Ok(existing);
            }
        }

        let nickname = identity
            .nickname
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| identity.phone.as_deref().map(mask_phone))
            .or_else(|| {
                identity
                    .email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("格友{}", &id[..4]));

        Ok(User {
            id,
            nickname,
            email: identity.email,
            phone: identity.phone,
            created_at: Utc::now(),
            linked_account: Some(LinkedAccount {
                provider: identity.provider,
                subject: identity.subject,
            }),
        })
    }

    /// Sign out; the device stays usable as a guest
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.inner.transition.lock().await;

        self.inner.session.clear_user().await?;
        self.inner.session.ensure_guest_device_id().await?;
        self.set_state(AuthState::Guest);

        tracing::info!("Logged out");
        Ok(())
    }

    /// Continue without an account
    pub async fn skip_login(&self) -> Result<String> {
        let _guard = self.inner.transition.lock().await;

        let guest_id = self.inner.session.ensure_guest_device_id().await?;
        if !self.is_authenticated() {
            self.set_state(AuthState::Guest);
        }

        tracing::info!("Continuing as guest {}", guest_id);
        Ok(guest_id)
    }

    /// Whether the user must register before going on
    pub fn check_registration_required(&self, trigger: RegistrationTrigger) -> bool {
        if self.is_authenticated() {
            return false;
        }

        match trigger {
            RegistrationTrigger::RecordCount(count) => count >= self.inner.record_threshold,
            gated => gated.is_gated_feature(),
        }
    }

    /// Registration check against the persisted local record count
    pub async fn registration_required_for_records(&self) -> Result<bool> {
        let count = self.inner.session.local_record_count().await?;
        Ok(self.check_registration_required(RegistrationTrigger::RecordCount(count)))
    }

    /// Owner id for new records: the account, or this device's guest id.
    /// An `Unknown` device enters guest mode.
    pub async fn owner_id(&self) -> Result<String> {
        let _guard = self.inner.transition.lock().await;

        if let Some(user) = self.current_user() {
            return Ok(user.id);
        }

        let guest_id = self.inner.session.ensure_guest_device_id().await?;
        if self.current_state() == AuthState::Unknown {
            self.set_state(AuthState::Guest);
        }
        Ok(guest_id)
    }
}

/// Stable account id for a provider subject
fn account_id(provider: LoginProvider, subject: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(subject.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}

/// 13800138000 -> 138****8000
fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 7 {
        return phone.to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::error::AppError;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex as StdMutex;

    struct FakeProvider {
        provider: LoginProvider,
        accept: bool,
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        fn provider(&self) -> LoginProvider {
            self.provider
        }

        async fn authenticate(
            &self,
            credentials: &Credentials,
        ) -> std::result::Result<ProviderIdentity, AuthError> {
            if !self.accept {
                return Err(AuthError::Rejected {
                    provider: self.provider,
                    reason: "account suspended".to_string(),
                });
            }
            let phone = match credentials {
                Credentials::Phone { phone, .. } => Some(phone.clone()),
                _ => None,
            };
            Ok(ProviderIdentity {
                provider: self.provider,
                subject: "subject-42".to_string(),
                nickname: None,
                email: None,
                phone,
            })
        }
    }

    /// Records the auth state seen while migrating
    struct RecordingMigrator {
        seen: StdMutex<Vec<AuthState>>,
        state: StdMutex<Option<watch::Receiver<AuthState>>>,
        fail: bool,
    }

    #[async_trait]
    impl GuestMigrator for RecordingMigrator {
        async fn migrate(&self, _guest_id: &str, _user: &User) -> Result<u64> {
            let current = self
                .state
                .lock()
                .unwrap()
                .as_ref()
                .map(|rx| rx.borrow().clone());
            if let Some(current) = current {
                self.seen.lock().unwrap().push(current);
            }
            if self.fail {
                Err(AppError::Generic("cloud unreachable".to_string()))
            } else {
                Ok(3)
            }
        }
    }

    async fn create_session() -> SessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_database(&pool).await.unwrap();
        SessionStore::new(Repository::new(pool))
    }

    fn phone_credentials() -> Credentials {
        Credentials::Phone {
            phone: "13800138000".to_string(),
            code: "246810".to_string(),
        }
    }

    fn service_with_migrator(
        session: SessionStore,
        accept: bool,
        fail_migration: bool,
    ) -> (AuthService, Arc<RecordingMigrator>) {
        let providers: Vec<Arc<dyn AuthProvider>> = vec![Arc::new(FakeProvider {
            provider: LoginProvider::Phone,
            accept,
        })];

        let migrator = Arc::new(RecordingMigrator {
            seen: StdMutex::new(Vec::new()),
            state: StdMutex::new(None),
            fail: fail_migration,
        });

        let service = AuthService::new(session, providers, migrator.clone(), 10);
        *migrator.state.lock().unwrap() = Some(service.subscribe());
        (service, migrator)
    }

    #[tokio::test]
    async fn test_login_with_guest_records_migrates_then_authenticates() {
        let session = create_session().await;
        session.ensure_guest_device_id().await.unwrap();
        session.increment_record_count().await.unwrap();

        let (auth, migrator) = service_with_migrator(session, true, false);
        auth.skip_login().await.unwrap();

        let outcome = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();

        assert_eq!(outcome.migration, MigrationOutcome::Migrated { records: 3 });
        assert_eq!(outcome.user.nickname, "138****8000");
        assert_eq!(migrator.seen.lock().unwrap().as_slice(), &[AuthState::Migrating]);
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_migration_still_authenticates() {
        let session = create_session().await;
        session.ensure_guest_device_id().await.unwrap();
        session.increment_record_count().await.unwrap();

        let (auth, _migrator) = service_with_migrator(session, true, true);

        let outcome = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();

        assert!(matches!(outcome.migration, MigrationOutcome::Failed { .. }));
        assert!(matches!(auth.current_state(), AuthState::Authenticated(_)));
    }

    #[tokio::test]
    async fn test_login_without_records_skips_migration() {
        let session = create_session().await;
        let (auth, migrator) = service_with_migrator(session, true, false);

        let outcome = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();

        assert_eq!(outcome.migration, MigrationOutcome::NotNeeded);
        assert!(migrator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_prior_state() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session.clone(), false, false);
        auth.skip_login().await.unwrap();

        let result = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await;

        assert!(matches!(result, Err(AppError::Auth(AuthError::Rejected { .. }))));
        assert_eq!(auth.current_state(), AuthState::Guest);
        assert!(session.load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session, true, false);

        let result = auth
            .login_with(
                LoginProvider::WeChat,
                Credentials::WeChat {
                    auth_code: "code".to_string(),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::ProviderNotConfigured(LoginProvider::WeChat)))
        ));
        assert_eq!(auth.current_state(), AuthState::Unknown);
    }

    #[tokio::test]
    async fn test_mismatched_credentials_rejected() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session, true, false);

        let result = auth
            .login_with(
                LoginProvider::Phone,
                Credentials::WeChat {
                    auth_code: "code".to_string(),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::InvalidCredentials { .. }))
        ));
    }

    #[tokio::test]
    async fn test_logout_keeps_record_count() {
        let session = create_session().await;
        session.increment_record_count().await.unwrap();
        session.increment_record_count().await.unwrap();

        let (auth, _migrator) = service_with_migrator(session.clone(), true, false);
        auth.login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();
        assert!(session.load_user().await.unwrap().is_some());

        auth.logout().await.unwrap();

        assert!(session.load_user().await.unwrap().is_none());
        assert_eq!(session.local_record_count().await.unwrap(), 2);
        assert_eq!(auth.current_state(), AuthState::Guest);
    }

    #[tokio::test]
    async fn test_restore() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session.clone(), true, false);
        assert_eq!(auth.restore().await.unwrap(), AuthState::Unknown);

        session.ensure_guest_device_id().await.unwrap();
        assert_eq!(auth.restore().await.unwrap(), AuthState::Guest);

        auth.login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();
        let (fresh, _migrator) = service_with_migrator(session, true, false);
        assert!(fresh.restore().await.unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn test_same_account_keeps_id_and_profile() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session, true, false);

        let first = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();
        let second = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();

        assert_eq!(first.user, second.user);
        assert_eq!(first.user.id.len(), 32);
    }

    #[tokio::test]
    async fn test_registration_required() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session, true, false);

        assert!(!auth.check_registration_required(RegistrationTrigger::RecordCount(0)));
        assert!(!auth.check_registration_required(RegistrationTrigger::RecordCount(9)));
        assert!(auth.check_registration_required(RegistrationTrigger::RecordCount(10)));
        assert!(auth.check_registration_required(RegistrationTrigger::RecordCount(25)));

        for gated in [
            RegistrationTrigger::CapsuleCreation,
            RegistrationTrigger::CloudSync,
            RegistrationTrigger::AiFeature,
            RegistrationTrigger::SocialFeature,
            RegistrationTrigger::ProUpgrade,
        ] {
            assert!(auth.check_registration_required(gated));
        }

        auth.login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();
        assert!(!auth.check_registration_required(RegistrationTrigger::CloudSync));
        assert!(!auth.check_registration_required(RegistrationTrigger::RecordCount(50)));
    }

    #[tokio::test]
    async fn test_owner_id_enters_guest_mode() {
        let session = create_session().await;
        let (auth, _migrator) = service_with_migrator(session, true, false);

        let owner = auth.owner_id().await.unwrap();
        assert!(owner.starts_with("guest-"));
        assert_eq!(auth.current_state(), AuthState::Guest);

        let outcome = auth
            .login_with(LoginProvider::Phone, phone_credentials())
            .await
            .unwrap();
        assert_eq!(auth.owner_id().await.unwrap(), outcome.user.id);
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("13800138000"), "138****8000");
        assert_eq!(mask_phone("12345"), "12345");
    }
}
