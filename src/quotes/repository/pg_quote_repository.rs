use async_trait::async_trait;
use crate::core::context::RequestContext;
use crate::core::library::{CatalogError, CatalogResult, ListParams};
use crate::core::repository::Repository;
use crate::quotes::domain::model::{QuoteEntity, QuoteParams, QuoteWithAuthorEntity};
use crate::quotes::repository::QuoteRepository;
use crate::utils::pg::{is_foreign_key_violation, like_pattern, run_on, PgConn};

const QUOTE_COLUMNS: &str = "id, content, author_id, source, tags, created_at, updated_at";

const SELECT_WITH_AUTHOR: &str = "SELECT q.id, q.content, q.author_id, q.source, q.tags, q.created_at, q.updated_at, \
                                  a.name AS author_name, a.bio AS author_bio \
                                  FROM quotes q JOIN authors a ON a.id = q.author_id";

#[derive(Debug, Clone)]
pub struct PgQuoteRepository {
    conn: PgConn,
}

impl PgQuoteRepository {
    pub(crate) fn new(conn: PgConn) -> Self {
        Self {
            conn,
        }
    }

    fn not_found(id: i64) -> CatalogError {
        CatalogError::not_found(format!("quote not found for {}", id).as_str())
    }

    // the foreign key is the last line of defense when an author disappears mid-write
    fn map_write_error(err: sqlx::Error, author_id: i64) -> CatalogError {
        if is_foreign_key_violation(&err) {
            return CatalogError::not_found(format!("author not found for {}", author_id).as_str());
        }
        CatalogError::from(err)
    }
}

#[async_trait]
impl Repository<QuoteEntity, QuoteWithAuthorEntity, QuoteParams> for PgQuoteRepository {
    async fn create(&self, ctx: &RequestContext, params: &QuoteParams) -> CatalogResult<QuoteEntity> {
        let sql = format!("INSERT INTO quotes (content, author_id, source, tags) VALUES ($1, $2, $3, $4) RETURNING {}",
                          QUOTE_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteEntity>(sql.as_str())
                .bind(params.content.as_str())
                .bind(params.author_id)
                .bind(params.source.as_deref())
                .bind(&params.tags);
            run_on!(&self.conn, query, fetch_one).map_err(|err| Self::map_write_error(err, params.author_id))
        }).await
    }

    async fn get(&self, ctx: &RequestContext, id: i64) -> CatalogResult<QuoteWithAuthorEntity> {
        let sql = format!("{} WHERE q.id = $1", SELECT_WITH_AUTHOR);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteWithAuthorEntity>(sql.as_str()).bind(id);
            run_on!(&self.conn, query, fetch_optional)
        }).await?.ok_or_else(|| Self::not_found(id))
    }

    async fn list(&self, ctx: &RequestContext, params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let sql = format!("{} ORDER BY q.id LIMIT $1 OFFSET $2", SELECT_WITH_AUTHOR);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteWithAuthorEntity>(sql.as_str())
                .bind(params.limit)
                .bind(params.offset);
            run_on!(&self.conn, query, fetch_all)
        }).await
    }

    async fn update(&self, ctx: &RequestContext, id: i64, params: &QuoteParams) -> CatalogResult<QuoteEntity> {
        let sql = format!("UPDATE quotes SET content = $2, author_id = $3, source = $4, tags = $5, \
                           updated_at = (now() AT TIME ZONE 'utc') WHERE id = $1 RETURNING {}", QUOTE_COLUMNS);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteEntity>(sql.as_str())
                .bind(id)
                .bind(params.content.as_str())
                .bind(params.author_id)
                .bind(params.source.as_deref())
                .bind(&params.tags);
            run_on!(&self.conn, query, fetch_optional).map_err(|err| Self::map_write_error(err, params.author_id))
        }).await?.ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> CatalogResult<()> {
        let res = ctx.within(async {
            let query = sqlx::query("DELETE FROM quotes WHERE id = $1").bind(id);
            run_on!(&self.conn, query, execute)
        }).await?;
        if res.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn count(&self, ctx: &RequestContext) -> CatalogResult<i64> {
        ctx.within(async {
            let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes");
            run_on!(&self.conn, query, fetch_one)
        }).await
    }

    async fn search(&self, ctx: &RequestContext, query: &str, params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let sql = format!("{} WHERE q.content ILIKE $1 ESCAPE '\\' ORDER BY q.id LIMIT $2 OFFSET $3", SELECT_WITH_AUTHOR);
        let pattern = like_pattern(query);
        ctx.within(async {
            let q = sqlx::query_as::<_, QuoteWithAuthorEntity>(sql.as_str())
                .bind(pattern.as_str())
                .bind(params.limit)
                .bind(params.offset);
            run_on!(&self.conn, q, fetch_all)
        }).await
    }

    async fn count_search(&self, ctx: &RequestContext, query: &str) -> CatalogResult<i64> {
        let pattern = like_pattern(query);
        ctx.within(async {
            let q = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes WHERE content ILIKE $1 ESCAPE '\\'")
                .bind(pattern.as_str());
            run_on!(&self.conn, q, fetch_one)
        }).await
    }
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    async fn list_by_author(&self, ctx: &RequestContext, author_id: i64,
                            params: &ListParams) -> CatalogResult<Vec<QuoteWithAuthorEntity>> {
        let sql = format!("{} WHERE q.author_id = $1 ORDER BY q.id LIMIT $2 OFFSET $3", SELECT_WITH_AUTHOR);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteWithAuthorEntity>(sql.as_str())
                .bind(author_id)
                .bind(params.limit)
                .bind(params.offset);
            run_on!(&self.conn, query, fetch_all)
        }).await
    }

    async fn count_by_author(&self, ctx: &RequestContext, author_id: i64) -> CatalogResult<i64> {
        ctx.within(async {
            let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotes WHERE author_id = $1")
                .bind(author_id);
            run_on!(&self.conn, query, fetch_one)
        }).await
    }

    async fn get_random(&self, ctx: &RequestContext) -> CatalogResult<QuoteWithAuthorEntity> {
        let sql = format!("{} ORDER BY random() LIMIT 1", SELECT_WITH_AUTHOR);
        ctx.within(async {
            let query = sqlx::query_as::<_, QuoteWithAuthorEntity>(sql.as_str());
            run_on!(&self.conn, query, fetch_optional)
        }).await?.ok_or_else(|| CatalogError::not_found("no quotes found"))
    }
}
