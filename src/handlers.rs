use crate::error::AppError;
use crate::models::{
    annotate, page_offset, pick_quiz_question, validate_new_question, Category, QuestionFilter, QuestionView,
    QuizQuestion, QuizRequest, QUESTIONS_PER_PAGE,
};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: BTreeMap<i64, String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionPageResponse {
    pub success: bool,
    pub categories: Vec<Category>,
    pub questions: Vec<QuestionView>,
    pub total_questions: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryQuestionsResponse {
    pub success: bool,
    pub current_category: String,
    pub questions: Vec<QuestionView>,
    pub total_questions: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub questions: Vec<QuestionView>,
    pub total_questions: i64,
}

#[derive(Debug, Serialize)]
pub struct AddQuestionResponse {
    pub success: bool,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub success: bool,
    pub question: Option<QuizQuestion>,
    #[serde(rename = "previousQuestions")]
    pub previous_questions: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// Non-integer path segments are unknown routes, not bad requests.
fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!("path rejected: {}", rejection);
        AppError::NotFound
    })
}

pub async fn get_categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = state.store.list_categories().await?;
    if categories.is_empty() {
        return Err(AppError::NotFound);
    }
    Ok(Json(CategoriesResponse {
        success: true,
        categories: categories.into_iter().map(|c| (c.id, c.kind)).collect(),
    }))
}

pub async fn get_questions(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<QuestionPageResponse>, AppError> {
    let page = path_id(path)?;
    let offset = page_offset(page).ok_or(AppError::NotFound)?;
    let filter = QuestionFilter::All;

    let total_questions = state.store.count_questions(&filter).await?;
    let categories = state.store.list_categories().await?;
    let rows = state
        .store
        .list_questions(&filter, offset, Some(QUESTIONS_PER_PAGE))
        .await?;
    if rows.is_empty() {
        return Err(AppError::NotFound);
    }
    let questions = annotate(rows, &categories)?;

    Ok(Json(QuestionPageResponse {
        success: true,
        categories,
        questions,
        total_questions,
    }))
}

pub async fn get_questions_by_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<CategoryQuestionsResponse>, AppError> {
    let category_id = path_id(path)?;
    let categories = state.store.list_categories().await?;
    let current_category = categories
        .iter()
        .find(|c| c.id == category_id)
        .map(|c| c.kind.clone())
        .ok_or(AppError::NotFound)?;

    let rows = state
        .store
        .list_questions(&QuestionFilter::Category(category_id), 0, None)
        .await?;
    let questions = annotate(rows, &categories)?;

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        current_category,
        total_questions: questions.len() as i64,
        questions,
    }))
}

pub async fn search_questions(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Json(body) = body.map_err(|rejection| {
        debug!("search body rejected: {}", rejection);
        AppError::BadRequest
    })?;
    let term = body
        .get("searchTerm")
        .and_then(Value::as_str)
        .filter(|term| !term.is_empty())
        .ok_or(AppError::MissingSearchTerm)?;

    let categories = state.store.list_categories().await?;
    let rows = state
        .store
        .list_questions(&QuestionFilter::Search(term.to_string()), 0, None)
        .await?;
    let questions = annotate(rows, &categories)?;

    Ok(Json(SearchResponse {
        success: true,
        total_questions: questions.len() as i64,
        questions,
    }))
}

pub async fn add_question(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AddQuestionResponse>, AppError> {
    let Json(body) = body.map_err(|rejection| {
        debug!("add question body rejected: {}", rejection);
        AppError::Unprocessable(Vec::new())
    })?;
    let new = validate_new_question(&body).map_err(AppError::Unprocessable)?;

    let saved = state.store.insert_question(new).await?;
    info!(question_id = saved.id, category = saved.category, "question added");

    Ok(Json(AddQuestionResponse {
        success: true,
        question: saved.question,
        answer: saved.answer,
        difficulty: saved.difficulty,
        category: saved.category,
    }))
}

pub async fn play_quiz(
    State(state): State<AppState>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        debug!("quiz body rejected: {}", rejection);
        AppError::Unprocessable(Vec::new())
    })?;
    let previous_questions = request.previous_ids();

    let pool = state.store.list_questions(&request.filter(), 0, None).await?;
    let question = pick_quiz_question(&mut rand::thread_rng(), &pool, &previous_questions);
    if question.is_none() {
        debug!(
            category = request.quiz_category.id.0,
            category_name = request.quiz_category.kind.as_deref().unwrap_or("all"),
            "quiz exhausted"
        );
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
        previous_questions,
    }))
}

pub async fn delete_question(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = path_id(path)?;
    match state.store.delete_question(id).await {
        Ok(removed) => {
            info!(question_id = id, removed, "question delete handled");
            Ok(Json(DeleteResponse { success: true }))
        }
        Err(err) => {
            warn!("failed to delete question {}: {}", id, err);
            Err(AppError::NotFound)
        }
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
