//! Link creation, resolution and owner-scoped management.

use std::sync::Arc;

use crate::domain::entities::{Link, LinkTotals, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{
    CodeStrategy, ShortCodeEncoder, generate_random_code, is_reserved_code, validate_alias,
};
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Upper bound on code candidates tried for one link.
const MAX_CODE_ATTEMPTS: u32 = 10;

/// Service for creating, resolving and managing shortened links.
///
/// Exactly one [`CodeStrategy`] is active per service instance. User aliases
/// and generated codes share one namespace, so every candidate is checked
/// against existing codes whichever way it was produced.
pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    strategy: CodeStrategy,
    encoder: ShortCodeEncoder,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>, strategy: CodeStrategy, encoder: ShortCodeEncoder) -> Self {
        Self {
            repository,
            strategy,
            encoder,
        }
    }

    pub fn strategy(&self) -> CodeStrategy {
        self.strategy
    }

    /// Creates a link owned by `owner`.
    ///
    /// An empty or missing alias means the code is generated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is invalid.
    /// Returns [`AppError::Unprocessable`] if the alias breaks the alias rules.
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    /// Returns [`AppError::Internal`] if no free code could be assigned.
    pub async fn create_link(
        &self,
        owner: i64,
        url: &str,
        alias: Option<&str>,
    ) -> Result<Link, AppError> {
        let url = normalize_url(url)
            .map_err(|e| AppError::bad_request("invalid url", json!({ "reason": e.to_string() })))?;

        let link = match alias.filter(|a| !a.is_empty()) {
            Some(alias) => self.create_with_alias(owner, url, alias).await?,
            None => match self.strategy {
                CodeStrategy::Derived => self.create_with_derived_code(owner, &url).await?,
                CodeStrategy::Random => self.create_with_random_code(owner, url).await?,
            },
        };

        tracing::info!(
            link_id = link.id,
            owner,
            code = %link.short_code,
            is_alias = link.is_alias,
            "link created"
        );
        Ok(link)
    }

    async fn create_with_alias(
        &self,
        owner: i64,
        url: String,
        alias: &str,
    ) -> Result<Link, AppError> {
        validate_alias(alias)?;
        self.ensure_code_available(alias).await?;

        self.repository
            .create(NewLink {
                user_id: owner,
                url,
                short_code: alias.to_string(),
                is_alias: true,
            })
            .await
    }

    /// Inserts the row first, then encodes its id into the code.
    ///
    /// The pending row is removed again if no code could be assigned.
    async fn create_with_derived_code(&self, owner: i64, url: &str) -> Result<Link, AppError> {
        let id = self.repository.insert_pending(owner, url).await?;

        match self.assign_derived_code(id).await {
            Ok(link) => Ok(link),
            Err(e) => {
                if let Err(cleanup) = self.repository.delete(id).await {
                    tracing::warn!(link_id = id, error = %cleanup, "failed to remove pending link");
                }
                Err(e)
            }
        }
    }

    async fn assign_derived_code(&self, id: i64) -> Result<Link, AppError> {
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = self.encoder.encode(id, attempt)?;

            if is_reserved_code(&code) || self.repository.code_exists(&code).await? {
                tracing::debug!(link_id = id, attempt, code = %code, "derived code taken");
                continue;
            }

            match self.repository.set_code(id, &code, false).await {
                Ok(Some(link)) => return Ok(link),
                Ok(None) => return Err(AppError::internal(format!("link {} vanished", id))),
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(format!(
            "no free derived code for link {} after {} attempts",
            id, MAX_CODE_ATTEMPTS
        )))
    }

    /// Draws random codes until one is free.
    ///
    /// A unique-index violation at insert counts as one more collision.
    async fn create_with_random_code(&self, owner: i64, url: String) -> Result<Link, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_random_code();

            if self.repository.code_exists(&code).await? {
                tracing::debug!(code = %code, "random code collision");
                continue;
            }

            let new_link = NewLink {
                user_id: owner,
                url: url.clone(),
                short_code: code,
                is_alias: false,
            };

            match self.repository.create(new_link).await {
                Ok(link) => return Ok(link),
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(format!(
            "no free random code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    async fn ensure_code_available(&self, code: &str) -> Result<(), AppError> {
        if self.repository.code_exists(code).await? {
            return Err(AppError::conflict(
                "alias not available",
                json!({ "alias": code }),
            ));
        }
        Ok(())
    }

    /// Resolves a short code to its destination and counts the click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        self.repository
            .record_click(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} not found", code), json!({})))
    }

    /// Like [`Self::resolve`] but leaves the click counter alone.
    pub async fn lookup(&self, code: &str) -> Result<String, AppError> {
        self.repository
            .find_by_code(code)
            .await?
            .map(|link| link.url)
            .ok_or_else(|| AppError::not_found(format!("{} not found", code), json!({})))
    }

    /// Returns one page of the owner's links, newest first, and their total count.
    ///
    /// `page` is 1-based.
    pub async fn list_links(
        &self,
        owner: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Link>, i64), AppError> {
        let limit = i64::from(page_size);
        let offset = i64::from(page.saturating_sub(1)) * limit;

        let links = self.repository.list_by_user(owner, limit, offset).await?;
        let total = self.repository.count_by_user(owner).await?;

        Ok((links, total))
    }

    /// Loads a link and checks that `owner` owns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the id is unknown.
    /// Returns [`AppError::Unauthorized`] if another account owns the link.
    pub async fn get_link(&self, owner: i64, id: i64) -> Result<Link, AppError> {
        let link = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("url not found", json!({ "id": id })))?;

        if !link.is_owned_by(owner) {
            tracing::warn!(link_id = id, owner, "access to foreign link refused");
            return Err(AppError::unauthorized("authorization failure"));
        }

        Ok(link)
    }

    /// Replaces a link's code with a user alias.
    ///
    /// Same rules as an alias given at creation.
    pub async fn update_alias(&self, owner: i64, id: i64, alias: &str) -> Result<Link, AppError> {
        self.get_link(owner, id).await?;
        validate_alias(alias)?;
        self.ensure_code_available(alias).await?;

        let link = self
            .repository
            .set_code(id, alias, true)
            .await?
            .ok_or_else(|| AppError::not_found("url not found", json!({ "id": id })))?;

        tracing::info!(link_id = id, owner, code = %alias, "link re-aliased");
        Ok(link)
    }

    pub async fn delete_link(&self, owner: i64, id: i64) -> Result<(), AppError> {
        self.get_link(owner, id).await?;

        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("url not found", json!({ "id": id })));
        }

        tracing::info!(link_id = id, owner, "link deleted");
        Ok(())
    }

    pub async fn totals(&self) -> Result<LinkTotals, AppError> {
        self.repository.totals().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn test_link(id: i64, owner: i64, code: &str, is_alias: bool) -> Link {
        Link::new(
            id,
            owner,
            "https://example.com/".to_string(),
            code.to_string(),
            is_alias,
            0,
            Utc::now(),
        )
    }

    fn service(repo: MockLinkRepository, strategy: CodeStrategy) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), strategy, ShortCodeEncoder::default())
    }

    #[tokio::test]
    async fn test_create_with_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_code_exists()
            .withf(|code| code == "my-link")
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create()
            .withf(|new_link| {
                new_link.short_code == "my-link"
                    && new_link.is_alias
                    && new_link.url == "https://example.com/page"
            })
            .times(1)
            .returning(|_| Ok(test_link(1, 7, "my-link", true)));

        let link = service(repo, CodeStrategy::Derived)
            .create_link(7, "example.com/page", Some("my-link"))
            .await
            .unwrap();

        assert_eq!(link.short_code, "my-link");
        assert!(link.is_alias);
    }

    #[tokio::test]
    async fn test_create_with_taken_alias() {
        let mut repo = MockLinkRepository::new();
        repo.expect_code_exists().times(1).returning(|_| Ok(true));
        repo.expect_create().times(0);

        let err = service(repo, CodeStrategy::Derived)
            .create_link(7, "https://example.com", Some("taken"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "alias not available");
    }

    #[tokio::test]
    async fn test_create_alias_length_checked_before_lookup() {
        let mut repo = MockLinkRepository::new();
        repo.expect_code_exists().times(0);

        let err = service(repo, CodeStrategy::Derived)
            .create_link(7, "https://example.com", Some("abc"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unprocessable { .. }));
    }

    #[tokio::test]
    async fn test_create_invalid_url() {
        let repo = MockLinkRepository::new();

        let err = service(repo, CodeStrategy::Derived)
            .create_link(7, "ftp://example.com/file", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "invalid url");
    }

    #[tokio::test]
    async fn test_create_derived_encodes_id() {
        let expected = ShortCodeEncoder::default().encode(42, 0).unwrap();
        let expected_in_set = expected.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_insert_pending()
            .withf(|owner, url| *owner == 7 && url == "https://example.com/")
            .times(1)
            .returning(|_, _| Ok(42));
        repo.expect_code_exists().times(1).returning(|_| Ok(false));
        repo.expect_set_code()
            .withf(move |id, code, is_alias| *id == 42 && code == expected_in_set && !is_alias)
            .times(1)
            .returning(|id, code, _| Ok(Some(test_link(id, 7, code, false))));

        let link = service(repo, CodeStrategy::Derived)
            .create_link(7, "example.com", Some(""))
            .await
            .unwrap();

        assert_eq!(link.id, 42);
        assert_eq!(link.short_code, expected);
        assert_eq!(link.short_code.len(), 8);
    }

    #[tokio::test]
    async fn test_create_derived_retries_when_alias_owns_code() {
        let encoder = ShortCodeEncoder::default();
        let canonical = encoder.encode(5, 0).unwrap();
        let fallback = encoder.encode(5, 1).unwrap();
        let fallback_in_set = fallback.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_insert_pending().returning(|_, _| Ok(5));
        repo.expect_code_exists()
            .times(2)
            .returning(move |code| Ok(code == canonical));
        repo.expect_set_code()
            .withf(move |_, code, _| code == fallback_in_set)
            .times(1)
            .returning(|id, code, _| Ok(Some(test_link(id, 7, code, false))));

        let link = service(repo, CodeStrategy::Derived)
            .create_link(7, "https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.short_code, fallback);
    }

    #[tokio::test]
    async fn test_create_derived_removes_pending_row_on_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert_pending().returning(|_, _| Ok(9));
        repo.expect_code_exists()
            .times(MAX_CODE_ATTEMPTS as usize)
            .returning(|_| Ok(true));
        repo.expect_delete()
            .withf(|id| *id == 9)
            .times(1)
            .returning(|_| Ok(true));

        let err = service(repo, CodeStrategy::Derived)
            .create_link(7, "https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_random_retries_until_free() {
        let mut repo = MockLinkRepository::new();
        let mut calls = 0;
        repo.expect_code_exists().times(3).returning(move |_| {
            calls += 1;
            Ok(calls < 3)
        });
        repo.expect_create()
            .withf(|new_link| new_link.short_code.len() == 8 && !new_link.is_alias)
            .times(1)
            .returning(|new_link| Ok(test_link(3, new_link.user_id, &new_link.short_code, false)));

        let link = service(repo, CodeStrategy::Random)
            .create_link(7, "https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.short_code.len(), 8);
    }

    #[tokio::test]
    async fn test_create_random_treats_insert_race_as_collision() {
        let mut repo = MockLinkRepository::new();
        repo.expect_code_exists().times(2).returning(|_| Ok(false));
        let mut inserts = 0;
        repo.expect_create().times(2).returning(move |new_link| {
            inserts += 1;
            if inserts == 1 {
                Err(AppError::conflict("alias not available", json!({})))
            } else {
                Ok(test_link(4, new_link.user_id, &new_link.short_code, false))
            }
        });

        let link = service(repo, CodeStrategy::Random)
            .create_link(7, "https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.id, 4);
    }

    #[tokio::test]
    async fn test_resolve_counts_click() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click()
            .withf(|code| code == "abcde")
            .times(1)
            .returning(|_| Ok(Some("https://example.com/page".to_string())));

        let url = service(repo, CodeStrategy::Derived)
            .resolve("abcde")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click().returning(|_| Ok(None));

        let err = service(repo, CodeStrategy::Derived)
            .resolve("nope123")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "nope123 not found");
    }

    #[tokio::test]
    async fn test_lookup_does_not_count() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "abcde")
            .returning(|code| Ok(Some(test_link(1, 7, code, true))));
        repo.expect_record_click().times(0);

        let url = service(repo, CodeStrategy::Derived)
            .lookup("abcde")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_list_links_pages() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_by_user()
            .withf(|owner, limit, offset| *owner == 7 && *limit == 20 && *offset == 40)
            .times(1)
            .returning(|_, _, _| Ok(vec![test_link(1, 7, "abcde", true)]));
        repo.expect_count_by_user().returning(|_| Ok(41));

        let (links, total) = service(repo, CodeStrategy::Derived)
            .list_links(7, 3, 20)
            .await
            .unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(total, 41);
    }

    #[tokio::test]
    async fn test_get_link_foreign_owner() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 8, "abcde", true))));

        let err = service(repo, CodeStrategy::Derived)
            .get_link(7, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert_eq!(err.to_string(), "authorization failure");
    }

    #[tokio::test]
    async fn test_get_link_unknown() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo, CodeStrategy::Derived)
            .get_link(7, 99)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_alias_foreign_owner_is_not_modified() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 8, "abcde", true))));
        repo.expect_set_code().times(0);

        let err = service(repo, CodeStrategy::Derived)
            .update_alias(7, 1, "fresh")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_update_alias_length_rejected() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 7, "abcde", true))));
        repo.expect_code_exists().times(0);

        let err = service(repo, CodeStrategy::Derived)
            .update_alias(7, 1, "waytoolongalias")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unprocessable { .. }));
    }

    #[tokio::test]
    async fn test_update_alias_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 7, "abcde", true))));
        repo.expect_code_exists()
            .withf(|code| code == "taken1")
            .returning(|_| Ok(true));
        repo.expect_set_code().times(0);

        let err = service(repo, CodeStrategy::Derived)
            .update_alias(7, 1, "taken1")
            .await
            .unwrap_err();

        match err {
            AppError::Conflict { message, .. } => assert_eq!(message, "alias not available"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_alias_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 7, "Xb81kPq0", false))));
        repo.expect_code_exists().returning(|_| Ok(false));
        repo.expect_set_code()
            .withf(|id, code, is_alias| *id == 1 && code == "fresh" && *is_alias)
            .times(1)
            .returning(|id, code, _| Ok(Some(test_link(id, 7, code, true))));

        let link = service(repo, CodeStrategy::Derived)
            .update_alias(7, 1, "fresh")
            .await
            .unwrap();

        assert_eq!(link.short_code, "fresh");
        assert!(link.is_alias);
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(test_link(id, 7, "abcde", true))));
        repo.expect_delete().times(1).returning(|_| Ok(true));

        service(repo, CodeStrategy::Derived)
            .delete_link(7, 1)
            .await
            .unwrap();
    }
}
