use crate::models::{Category, NewQuestion, Question, QuestionFilter};
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub trait TriviaStore: Send + Sync {
    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, StoreError>>;

    fn count_questions<'a>(&'a self, filter: &'a QuestionFilter) -> BoxFuture<'a, Result<i64, StoreError>>;

    fn list_questions<'a>(
        &'a self,
        filter: &'a QuestionFilter,
        offset: i64,
        limit: Option<i64>,
    ) -> BoxFuture<'a, Result<Vec<Question>, StoreError>>;

    fn insert_question(&self, new: NewQuestion) -> BoxFuture<'_, Result<Question, StoreError>>;

    fn delete_question(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>>;
}

pub fn default_categories() -> Vec<Category> {
    ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
        .into_iter()
        .zip(1..)
        .map(|(kind, id)| Category { id, kind: kind.to_string() })
        .collect()
}

#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") {
            // every connection to an in-memory database sees its own empty schema
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &QuestionFilter) {
    match filter {
        QuestionFilter::All => {}
        QuestionFilter::Category(id) => {
            builder.push(" WHERE category = ").push_bind(*id);
        }
        // sqlite lower() folds ascii only, search rows are matched in rust
        QuestionFilter::Search(_) => {}
    }
}

impl SqlStore {
    async fn search(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, Question>(
            "SELECT id, question, answer, category, difficulty FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter(|q| filter.matches(q)).collect())
    }
}

impl TriviaStore for SqlStore {
    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, StoreError>> {
        Box::pin(async move {
            let rows = sqlx::query_as::<_, Category>("SELECT id, type FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        })
    }

    fn count_questions<'a>(&'a self, filter: &'a QuestionFilter) -> BoxFuture<'a, Result<i64, StoreError>> {
        Box::pin(async move {
            if let QuestionFilter::Search(_) = filter {
                return Ok(self.search(filter).await?.len() as i64);
            }
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM questions");
            push_filter(&mut builder, filter);
            let total = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
            Ok(total)
        })
    }

    fn list_questions<'a>(
        &'a self,
        filter: &'a QuestionFilter,
        offset: i64,
        limit: Option<i64>,
    ) -> BoxFuture<'a, Result<Vec<Question>, StoreError>> {
        Box::pin(async move {
            if let QuestionFilter::Search(_) = filter {
                let matching = self.search(filter).await?.into_iter().skip(offset.max(0) as usize);
                let rows: Vec<Question> = match limit {
                    Some(limit) => matching.take(limit.max(0) as usize).collect(),
                    None => matching.collect(),
                };
                return Ok(rows);
            }
            let mut builder =
                QueryBuilder::<Sqlite>::new("SELECT id, question, answer, category, difficulty FROM questions");
            push_filter(&mut builder, filter);
            // sqlite reads a negative limit as "no limit"
            builder
                .push(" ORDER BY id LIMIT ")
                .push_bind(limit.unwrap_or(-1))
                .push(" OFFSET ")
                .push_bind(offset.max(0));
            let rows = builder.build_query_as::<Question>().fetch_all(&self.pool).await?;
            Ok(rows)
        })
    }

    fn insert_question(&self, new: NewQuestion) -> BoxFuture<'_, Result<Question, StoreError>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO questions (question, answer, category, difficulty) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(&new.question)
            .bind(&new.answer)
            .bind(new.category)
            .bind(new.difficulty)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(Question {
                id,
                question: new.question,
                answer: new.answer,
                category: new.category,
                difficulty: new.difficulty,
            })
        })
    }

    fn delete_question(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;
            let result = sqlx::query("DELETE FROM questions WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(result.rows_affected() > 0)
        })
    }
}

pub struct InMemoryStore {
    categories: RwLock<Vec<Category>>,
    questions: RwLock<BTreeMap<i64, Question>>,
    next_question_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: RwLock::new(categories),
            questions: RwLock::new(BTreeMap::new()),
            next_question_id: AtomicI64::new(1),
        }
    }

    pub fn seeded() -> Self {
        Self::new(default_categories())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TriviaStore for InMemoryStore {
    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, StoreError>> {
        Box::pin(async move {
            let mut categories = self.categories.read().await.clone();
            categories.sort_by_key(|c| c.id);
            Ok(categories)
        })
    }

    fn count_questions<'a>(&'a self, filter: &'a QuestionFilter) -> BoxFuture<'a, Result<i64, StoreError>> {
        Box::pin(async move {
            let questions = self.questions.read().await;
            Ok(questions.values().filter(|q| filter.matches(q)).count() as i64)
        })
    }

    fn list_questions<'a>(
        &'a self,
        filter: &'a QuestionFilter,
        offset: i64,
        limit: Option<i64>,
    ) -> BoxFuture<'a, Result<Vec<Question>, StoreError>> {
        Box::pin(async move {
            let questions = self.questions.read().await;
            let matching = questions
                .values()
                .filter(|q| filter.matches(q))
                .skip(offset.max(0) as usize)
                .cloned();
            let rows: Vec<Question> = match limit {
                Some(limit) => matching.take(limit.max(0) as usize).collect(),
                None => matching.collect(),
            };
            Ok(rows)
        })
    }

    fn insert_question(&self, new: NewQuestion) -> BoxFuture<'_, Result<Question, StoreError>> {
        Box::pin(async move {
            let id = self.next_question_id.fetch_add(1, Ordering::SeqCst);
            let question = Question {
                id,
                question: new.question,
                answer: new.answer,
                category: new.category,
                difficulty: new.difficulty,
            };
            self.questions.write().await.insert(id, question.clone());
            Ok(question)
        })
    }

    fn delete_question(&self, id: i64) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move { Ok(self.questions.write().await.remove(&id).is_some()) })
    }
}
