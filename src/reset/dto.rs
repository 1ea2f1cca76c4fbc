use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub token: String,
    pub email: String,
}
