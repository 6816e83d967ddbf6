//! 患者自助面板：资料、申请、支付历史、收藏

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::decode_list;
use crate::models::patient::{Application, Interest, PatientProfile, ProfileUpdate};
use crate::models::payment::PaymentRecord;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

impl ApiClient {
    pub async fn profile(&self) -> Result<PatientProfile, ApiError> {
        self.get("/api/v1/patient/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<PatientProfile, ApiError> {
        self.patch("/api/v1/patient/profile/", update).await
    }

    /// 上传头像
    ///
    /// multipart 表单由工厂按需重建，内容类型由传输层设置。
    pub async fn upload_avatar(
        &self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<PatientProfile, ApiError> {
        let file_name = file_name.into();
        self.post_multipart("/api/v1/patient/profile/avatar/", move || {
            Form::new().part(
                "avatar",
                Part::bytes(bytes.clone()).file_name(file_name.clone()),
            )
        })
        .await
    }

    pub async fn applications(&self) -> Result<Vec<Application>, ApiError> {
        let value: Value = self.get("/api/v1/patient/applications/").await?;
        decode_list(value)
    }

    pub async fn payment_history(&self) -> Result<Vec<PaymentRecord>, ApiError> {
        let value: Value = self.get("/api/v1/patient/payments/").await?;
        decode_list(value)
    }

    pub async fn interests(&self) -> Result<Vec<Interest>, ApiError> {
        let value: Value = self.get("/api/v1/patient/interests/").await?;
        decode_list(value)
    }
}
