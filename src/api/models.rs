use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}
