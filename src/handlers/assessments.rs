use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::db::journal::insert_assessment;
use crate::db::users::require_user_by_email;
use crate::dto::{normalize_email, AssessmentRequest, AssessmentResponse, QuestionsResponse};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// GAD-7.
const ANXIETY_QUESTIONS: &[&str] = &[
    "Feeling nervous, anxious, or on edge",
    "Not being able to stop or control worrying",
    "Worrying too much about different things",
    "Trouble relaxing",
    "Being so restless that it is hard to sit still",
    "Becoming easily annoyed or irritable",
    "Feeling afraid, as if something awful might happen",
];

/// PHQ-9.
const DEPRESSION_QUESTIONS: &[&str] = &[
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself, or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed, or being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead, or of hurting yourself in some way",
];

/// DASS-21 stress subscale.
const STRESS_QUESTIONS: &[&str] = &[
    "Finding it hard to wind down",
    "Tending to over-react to situations",
    "Feeling that you were using a lot of nervous energy",
    "Finding yourself getting agitated",
    "Finding it difficult to relax",
    "Being intolerant of anything that kept you from getting on with what you were doing",
    "Feeling that you were rather touchy",
];

/// Question bank for an assessment type. Every item is answered on the 0-3
/// scale, keyed `q0`, `q1`, ... in bank order.
pub fn question_bank(assessment_type: &str) -> Option<&'static [&'static str]> {
    match assessment_type {
        "anxiety" => Some(ANXIETY_QUESTIONS),
        "depression" => Some(DEPRESSION_QUESTIONS),
        "stress" => Some(STRESS_QUESTIONS),
        _ => None,
    }
}

pub async fn assessment_questions(
    Path(assessment_type): Path<String>,
) -> AppResult<Json<QuestionsResponse>> {
    let assessment_type = parse_assessment_type(&assessment_type)?;
    let questions = question_bank(&assessment_type)
        .ok_or_else(|| AppError::NotFound("Assessment type not found".into()))?;

    Ok(Json(QuestionsResponse {
        assessment: assessment_type,
        questions,
    }))
}

pub async fn submit_assessment(
    State(state): State<AppState>,
    Path(assessment_type): Path<String>,
    Json(body): Json<AssessmentRequest>,
) -> AppResult<(StatusCode, Json<AssessmentResponse>)> {
    let assessment_type = parse_assessment_type(&assessment_type)?;
    body.validate()?;

    let user = require_user_by_email(&state.db, &normalize_email(&body.email)).await?;
    let score = body.score();
    let assessment = insert_assessment(&state.db, user.id, &assessment_type, score).await?;

    tracing::info!(
        user_id = %user.id,
        assessment_type = %assessment_type,
        score,
        "Assessment recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse {
            result: format!("Your {} score is {}.", assessment_type, score),
            score,
            assessment,
        }),
    ))
}

/// Lowercased label of at most 50 ASCII letters, digits, `-` or `_`.
fn parse_assessment_type(raw: &str) -> AppResult<String> {
    let label = raw.trim().to_lowercase();
    let valid = !label.is_empty()
        && label.len() <= 50
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(label)
    } else {
        Err(AppError::Validation("Invalid assessment type".into()))
    }
}
