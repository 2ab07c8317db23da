pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::pipeline::handlers as pipeline;
use crate::speech::handlers as speech;
use crate::state::AppState;
use crate::tryit::handlers as tryit;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening & interviews
        .route("/api/v1/triage", post(matching::handle_triage))
        .route(
            "/api/v1/interviews/start",
            post(matching::handle_start_interview),
        )
        .route(
            "/api/v1/interviews/next-question",
            post(matching::handle_next_question),
        )
        .route(
            "/api/v1/interviews/evaluate",
            post(matching::handle_evaluate),
        )
        // Recruiter dashboards
        .route("/api/v1/pipeline/screened", get(pipeline::handle_screened))
        .route(
            "/api/v1/pipeline/recruiters",
            get(pipeline::handle_recruiters),
        )
        .route("/api/v1/pipeline/jobs/open", get(pipeline::handle_open_jobs))
        .route(
            "/api/v1/pipeline/jobs/closed",
            get(pipeline::handle_closed_jobs),
        )
        .route(
            "/api/v1/pipeline/jobs/:job_id",
            get(pipeline::handle_job_detail),
        )
        .route(
            "/api/v1/pipeline/jobs/:job_id/candidates",
            get(pipeline::handle_job_candidates),
        )
        .route(
            "/api/v1/pipeline/details/:job_id/:applicant_id",
            get(pipeline::handle_pair_details),
        )
        .route(
            "/api/v1/pipeline/interviews/chatbot",
            get(pipeline::handle_chatbot_interviews),
        )
        .route(
            "/api/v1/pipeline/interviews/hr",
            get(pipeline::handle_hr_interviews),
        )
        .route(
            "/api/v1/pipeline/hr-feedback",
            post(pipeline::handle_hr_feedback),
        )
        .route("/api/v1/pipeline/screen", post(pipeline::handle_screen))
        // Try it
        .route("/api/v1/tryit/users", get(tryit::handle_list_users))
        .route("/api/v1/tryit/jobs/:job_id/apply", post(tryit::handle_apply))
        .route("/api/v1/tryit/users/:user_id/result", get(tryit::handle_result))
        // Speech
        .route(
            "/api/v1/speech/synthesize",
            post(speech::handle_synthesize),
        )
        .route(
            "/api/v1/speech/transcribe",
            post(speech::handle_transcribe),
        )
        .route("/static/audio/:file", get(speech::handle_get_audio))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::matching::orchestrator::tests::{applicant_row, job_row, MemoryStore, StubLlm};
    use crate::state::tests::test_state;

    fn router_with(llm: Arc<StubLlm>) -> Router {
        let store = MemoryStore::default();
        store
            .jobs
            .lock()
            .unwrap()
            .insert("1".to_string(), job_row("1", "Dev", "construir API"));
        store
            .applicants
            .lock()
            .unwrap()
            .insert("10".to_string(), applicant_row("10", "10 anos de Python e SQL"));
        build_router(test_state(Arc::new(store), llm))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router_with(Arc::new(StubLlm::replying("")));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "recruiter-api");
    }

    #[tokio::test]
    async fn test_next_question_round_trip() {
        let app = router_with(Arc::new(StubLlm::replying("Olá, Ana! Pode se apresentar?")));
        let response = app
            .oneshot(json_post(
                "/api/v1/interviews/next-question",
                serde_json::json!({"job_id": "1", "applicant_id": "10", "history": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["question"], "Olá, Ana! Pode se apresentar?");
    }

    #[tokio::test]
    async fn test_llm_failure_maps_to_bad_gateway() {
        let app = router_with(Arc::new(StubLlm::failing(429)));
        let response = app
            .oneshot(json_post(
                "/api/v1/interviews/evaluate",
                serde_json::json!({
                    "job_id": "1",
                    "applicant_id": "10",
                    "questions": ["Q"],
                    "answers": ["A"]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_unparseable_triage_returns_raw_content() {
        let app = router_with(Arc::new(StubLlm::replying("nota: oitenta")));
        let response = app
            .oneshot(json_post(
                "/api/v1/interviews/start",
                serde_json::json!({"job_id": "1", "applicant_id": "10"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "LLM_PARSE_ERROR");
        assert_eq!(body["error"]["raw"], "nota: oitenta");
    }

    #[tokio::test]
    async fn test_tryit_apply_rejects_non_pdf_before_llm_call() {
        let llm = Arc::new(StubLlm::replying(""));
        let app = router_with(llm.clone());

        let boundary = "recruiter-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"cv\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             apenas texto\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/tryit/jobs/1/apply")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tryit_apply_unknown_job_is_not_found() {
        let app = router_with(Arc::new(StubLlm::replying("")));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/tryit/jobs/999/apply")
            .header("content-type", "multipart/form-data; boundary=x")
            .body(Body::from("--x--\r\n"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_text() {
        let app = router_with(Arc::new(StubLlm::replying("")));
        let response = app
            .oneshot(json_post(
                "/api/v1/speech/synthesize",
                serde_json::json!({"text": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
