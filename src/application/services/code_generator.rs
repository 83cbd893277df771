//! Unique short code generation against the historical code space.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;
use crate::utils::code_generator::{
    DEFAULT_CODE_LENGTH, is_reserved_code, random_code, validate_custom_code,
};

/// Retry budget used when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Produces codes that have never been reserved before and claims custom codes.
///
/// The random source is injectable: two generators built with the same seed
/// draw the same candidate sequence.
pub struct CodeGenerator<S: PersistenceStore + ?Sized> {
    store: Arc<S>,
    rng: Mutex<StdRng>,
    length: usize,
    max_attempts: usize,
}

impl<S: PersistenceStore + ?Sized> CodeGenerator<S> {
    /// Creates a generator seeded from the operating system.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    /// Creates a deterministic generator.
    pub fn with_seed(store: Arc<S>, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(store: Arc<S>, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
            length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the length of generated codes.
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Sets how many candidates are drawn before giving up.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn code_length(&self) -> usize {
        self.length
    }

    /// Generates and reserves a code of the configured length.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeSpaceExhausted`] if every attempt collided.
    pub async fn generate(&self) -> Result<String, AppError> {
        self.generate_with_length(self.length).await
    }

    /// Generates and reserves a code of `length` characters.
    ///
    /// A candidate is rejected if it was ever reserved, including by deleted
    /// links. The returned code is already claimed in the store.
    pub async fn generate_with_length(&self, length: usize) -> Result<String, AppError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.draw(length);

            if self.claim(&candidate).await? {
                return Ok(candidate);
            }

            metrics::counter!("shortlink_code_collisions_total").increment(1);
            tracing::warn!(attempt, code = %candidate, "code collision, retrying");
        }

        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Checks the format of a caller-supplied code.
    pub fn validate_custom_code(&self, code: &str) -> Result<(), AppError> {
        validate_custom_code(code)
    }

    /// Atomically claims a custom code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeTaken`] if the code was ever reserved.
    pub async fn reserve(&self, code: &str) -> Result<(), AppError> {
        if self.store.reserve_code(code).await? {
            Ok(())
        } else {
            Err(AppError::code_taken(code))
        }
    }

    /// Reserves `candidate` unless it is route-shadowed or was ever used.
    async fn claim(&self, candidate: &str) -> Result<bool, AppError> {
        if is_reserved_code(candidate) {
            return Ok(false);
        }

        Ok(!self.store.code_exists(candidate).await? && self.store.reserve_code(candidate).await?)
    }

    fn draw(&self, length: usize) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_code(&mut *rng, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockPersistenceStore;
    use crate::utils::code_generator::is_alphabet_code;
    use mockall::Sequence;

    #[tokio::test]
    async fn test_generate_returns_reserved_code() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().times(1).returning(|_| Ok(false));
        store.expect_reserve_code().times(1).returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 7);
        let code = generator.generate().await.unwrap();

        assert_eq!(code.len(), DEFAULT_CODE_LENGTH);
        assert!(is_alphabet_code(&code));
    }

    #[tokio::test]
    async fn test_generate_is_deterministic_for_seed() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().returning(|_| Ok(false));
        store.expect_reserve_code().returning(|_| Ok(true));
        let store = Arc::new(store);

        let a = CodeGenerator::with_seed(store.clone(), 99);
        let b = CodeGenerator::with_seed(store, 99);

        for _ in 0..3 {
            assert_eq!(a.generate().await.unwrap(), b.generate().await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_generate_retries_after_collision() {
        let mut store = MockPersistenceStore::new();
        let mut seq = Sequence::new();
        store
            .expect_code_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        store
            .expect_code_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        store
            .expect_reserve_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 1);
        assert!(generator.generate().await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_treats_lost_reservation_as_collision() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().times(2).returning(|_| Ok(false));
        let mut seq = Sequence::new();
        store
            .expect_reserve_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        store
            .expect_reserve_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 2);
        assert!(generator.generate().await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_exhausts_attempts() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().times(4).returning(|_| Ok(true));
        store.expect_reserve_code().times(0);

        let generator = CodeGenerator::with_seed(Arc::new(store), 3).max_attempts(4);
        let err = generator.generate().await.unwrap_err();

        assert!(matches!(err, AppError::CodeSpaceExhausted { attempts: 4 }));
    }

    #[tokio::test]
    async fn test_generate_propagates_persistence_failure() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_code_exists()
            .times(1)
            .returning(|code| Err(AppError::persistence("code_exists", code, "timeout")));

        let generator = CodeGenerator::with_seed(Arc::new(store), 4);
        let err = generator.generate().await.unwrap_err();

        assert!(matches!(err, AppError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_generate_with_configured_length() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().returning(|_| Ok(false));
        store.expect_reserve_code().returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 5).length(10);

        assert_eq!(generator.code_length(), 10);
        assert_eq!(generator.generate().await.unwrap().len(), 10);
        assert_eq!(generator.generate_with_length(4).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_claim_skips_route_codes_without_touching_store() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().times(0);
        store.expect_reserve_code().times(0);

        let generator = CodeGenerator::with_seed(Arc::new(store), 8);

        assert!(!generator.claim("health").await.unwrap());
        assert!(!generator.claim("api").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_reserves_free_code() {
        let mut store = MockPersistenceStore::new();
        store.expect_code_exists().times(1).returning(|_| Ok(false));
        store
            .expect_reserve_code()
            .withf(|code| code == "Health")
            .times(1)
            .returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 8);

        assert!(generator.claim("Health").await.unwrap());
    }

    #[tokio::test]
    async fn test_reserve_taken_code() {
        let mut store = MockPersistenceStore::new();
        store
            .expect_reserve_code()
            .withf(|code| code == "promo")
            .times(1)
            .returning(|_| Ok(false));

        let generator = CodeGenerator::with_seed(Arc::new(store), 6);
        let err = generator.reserve("promo").await.unwrap_err();

        assert!(matches!(err, AppError::CodeTaken { code } if code == "promo"));
    }

    #[tokio::test]
    async fn test_reserve_free_code() {
        let mut store = MockPersistenceStore::new();
        store.expect_reserve_code().times(1).returning(|_| Ok(true));

        let generator = CodeGenerator::with_seed(Arc::new(store), 6);
        assert!(generator.reserve("promo").await.is_ok());
    }
}
