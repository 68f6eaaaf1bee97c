use async_trait::async_trait;
use crate::authors::domain::model::{AuthorEntity, AuthorParams};
use crate::authors::repository::AuthorRepository;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult, ListParams};
use crate::core::repository::{Repository, RowLock};
use crate::utils::pg::{like_pattern, run_on, PgConn};

const AUTHOR_COLUMNS: &str = "id, name, bio, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgAuthorRepository {
    conn: PgConn,
}

impl PgAuthorRepository {
    pub(crate) fn new(conn: PgConn) -> Self {
        Self {
            conn,
        }
    }

    fn not_found(id: i64) -> CatalogError {
        CatalogError::not_found(format!("author not found for {}", id).as_str())
    }
}

#[async_trait]
impl Repository<AuthorEntity, AuthorEntity, AuthorParams> for PgAuthorRepository {
    async fn create(&self, ctx: &RequestContext, params: &AuthorParams) -> CatalogResult<AuthorEntity> {
        let sql = format!("INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING {}", AUTHOR_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, AuthorEntity>(sql.as_str())
                .bind(params.name.as_str())
                .bind(params.bio.as_deref());
            run_on!(&self.conn, query, fetch_one)
        }).await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> CatalogResult<AuthorEntity> {
        let sql = format!("SELECT {} FROM authors WHERE id = $1", AUTHOR_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, AuthorEntity>(sql.as_str()).bind(id);
            run_on!(&self.conn, query, fetch_optional)
        }).await?.ok_or_else(|| Self::not_found(id))
    }

    async fn list(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<Vec<AuthorEntity>> {
        let sql = format!("SELECT {} FROM authors ORDER BY id LIMIT $1 OFFSET $2", AUTHOR_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, AuthorEntity>(sql.as_str())
                .bind(params.limit)
                .bind(params.offset);
            run_on!(&self.conn, query, fetch_all)
        }).await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, params: &AuthorParams) -> CatalogResult<AuthorEntity> {
        let sql = format!("UPDATE authors SET name = $2, bio = $3, updated_at = (now() AT TIME ZONE 'utc') \
                           WHERE id = $1 RETURNING {}", AUTHOR_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, AuthorEntity>(sql.as_str())
                .bind(id)
                .bind(params.name.as_str())
                .bind(params.bio.as_deref());
            run_on!(&self.conn, query, fetch_optional)
        }).await?.ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        let res = ctx.within(async {
            let query = sqlx::query("DELETE FROM authors WHERE id = $1").bind(id);
            run_on!(&self.conn, query, execute)
        }).await?;
        if res.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> CatalogResult<i64> {
        ctx.within(async {
            let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM authors");
            run_on!(&self.conn, query, fetch_one)
        }).await
    }

    async fn search(&self, ctx: &RequestContext, query: &str, params: &ListParams) -> CatalogResult<Vec<AuthorEntity>> {
        // exact matches first so the duplicate-name check only needs the first row
        let sql = format!("SELECT {} FROM authors WHERE name ILIKE $1 ESCAPE '\\' \
                           ORDER BY (name = $2) DESC, id LIMIT $3 OFFSET $4", AUTHOR_COLUMNS);
        let pattern = like_pattern(query);
        ctx.within(async {
            let q = sqlx::query_as::<_, AuthorEntity>(sql.as_str())
                .bind(pattern.as_str())
                .bind(query)
                .bind(params.limit)
                .bind(params.offset);
            run_on!(&self.conn, q, fetch_all)
        }).await
    }

    async fn count_search(&self, ctx: &RequestContext, query: &str) -> CatalogResult<i64> {
        let pattern = like_pattern(query);
        ctx.within(async {
            let q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM authors WHERE name ILIKE $1 ESCAPE '\\'")
                .bind(pattern.as_str());
            run_on!(&self.conn, q, fetch_one)
        }).await
    }
}

#[async_trait]
impl AuthorRepository for PgAuthorRepository {
    async fn get_locked(&self, ctx: &RequestContext, id: i64, lock: RowLock) -> CatalogResult<AuthorEntity> {
        let clause = match lock {
            RowLock::Share => { "FOR SHARE" }
            RowLock::Exclusive => { "FOR UPDATE" }
        };
        let sql = format!("SELECT {} FROM authors WHERE id = $1 {}", AUTHOR_COLUMNS, clause);
        ctx.within(async {
            let query = sqlx::query_as::<_, AuthorEntity>(sql.as_str()).bind(id);
            run_on!(&self.conn, query, fetch_optional)
        }).await?.ok_or_else(|| Self::not_found(id))
    }

    async fn lock_name(&self, ctx: &RequestContext, name: &str) -> CatalogResult<()> {
        ctx.within(async {
            let query = sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))").bind(name);
            run_on!(&self.conn, query, execute)
        }).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use sqlx::PgPool;
    use uuid::Uuid;
    use crate::authors::domain::model::AuthorParams;
    use crate::authors::repository::AuthorRepository;
    use crate::authors::repository::pg_author_repository::PgAuthorRepository;
    use crate::core::context::RequestContext;
    use crate::core::library::ListParams;
    use crate::core::repository::{Repository, RowLock};
    use crate::utils::pg::{connect_test_pool, PgConn};

    lazy_static! {
        static ref POOL: AsyncOnce<PgPool> = AsyncOnce::new(async {
                connect_test_pool().await
            });
    }

    async fn repo() -> PgAuthorRepository {
        PgAuthorRepository::new(PgConn::Pool(POOL.get().await.clone()))
    }

    #[tokio::test]
    #[ignore = "requires a running postgres configured through DB_* variables"]
    async fn test_should_create_get_authors() {
        let ctx = RequestContext::background();
        let authors_repo = repo().await;
        let name = format!("author {}", Uuid::new_v4());
        let author = authors_repo.create(&ctx, &AuthorParams::new(name.as_str(), Some("bio")))
            .await.expect("should create author");
        assert!(author.id > 0);
        let loaded = authors_repo.get(&ctx, author.id).await.expect("should return author");
        assert_eq!(author, loaded);
        let locked = authors_repo.get_locked(&ctx, author.id, RowLock::Share).await.expect("should return author");
        assert_eq!(author.id, locked.id);
    }

    #[tokio::test]
    #[ignore = "requires a running postgres configured through DB_* variables"]
    async fn test_should_create_update_delete_authors() {
        let ctx = RequestContext::background();
        let authors_repo = repo().await;
        let name = format!("author {}", Uuid::new_v4());
        let author = authors_repo.create(&ctx, &AuthorParams::new(name.as_str(), None))
            .await.expect("should create author");
        let updated = authors_repo.update(&ctx, author.id, &AuthorParams::new("renamed", Some("new bio")))
            .await.expect("should update author");
        assert_eq!("renamed", updated.name.as_str());
        assert_eq!(Some("new bio".to_string()), updated.bio);
        assert!(updated.updated_at >= author.updated_at);

        authors_repo.delete(&ctx, author.id).await.expect("should delete author");
        assert!(authors_repo.get(&ctx, author.id).await.expect_err("should be deleted").is_not_found());
        assert!(authors_repo.delete(&ctx, author.id).await.expect_err("should be missing").is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres configured through DB_* variables"]
    async fn test_should_search_authors() {
        let ctx = RequestContext::background();
        let authors_repo = repo().await;
        let marker = Uuid::new_v4().to_string();
        let exact = marker.clone();
        let _ = authors_repo.create(&ctx, &AuthorParams::new(format!("{} junior", marker).as_str(), None))
            .await.expect("should create author");
        let _ = authors_repo.create(&ctx, &AuthorParams::new(exact.as_str(), None))
            .await.expect("should create author");
        let found = authors_repo.search(&ctx, marker.to_uppercase().as_str(), &ListParams::default())
            .await.expect("should search authors");
        assert_eq!(2, found.len());
        let found = authors_repo.search(&ctx, exact.as_str(), &ListParams::first())
            .await.expect("should search authors");
        assert_eq!(exact, found[0].name);
        assert_eq!(2, authors_repo.count_search(&ctx, marker.as_str()).await.expect("should count"));
        assert_eq!(0, authors_repo.count_search(&ctx, format!("{}%", marker).as_str()).await.expect("should count"));
        authors_repo.lock_name(&ctx, exact.as_str()).await.expect("should lock name");
    }
}
