//! 公开内容目录：医生、医疗服务、分院、新闻、媒体库

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::models::appointment::AvailabilitySlot;
use crate::models::catalog::{Branch, ClinicService, Doctor, MediaItem, NewsItem};
use crate::models::decode_list;
use chrono::NaiveDate;
use serde_json::Value;

impl ApiClient {
    pub async fn doctors(&self, lang: &str) -> Result<Vec<Doctor>, ApiError> {
        let value: Value = self
            .get(&format!("/api/v1/doctors/?lang={}", lang))
            .await?;
        decode_list(value)
    }

    pub async fn doctor(&self, id: i64) -> Result<Doctor, ApiError> {
        self.get(&format!("/api/v1/doctors/{}/", id)).await
    }

    pub async fn clinic_services(&self, lang: &str) -> Result<Vec<ClinicService>, ApiError> {
        let value: Value = self
            .get(&format!("/api/v1/services/?lang={}", lang))
            .await?;
        decode_list(value)
    }

    pub async fn branches(&self, lang: &str) -> Result<Vec<Branch>, ApiError> {
        let value: Value = self
            .get(&format!("/api/v1/branches/?lang={}", lang))
            .await?;
        decode_list(value)
    }

    pub async fn news(&self, lang: &str) -> Result<Vec<NewsItem>, ApiError> {
        let value: Value = self.get(&format!("/api/v1/news/?lang={}", lang)).await?;
        decode_list(value)
    }

    pub async fn news_item(&self, id: i64) -> Result<NewsItem, ApiError> {
        self.get(&format!("/api/v1/news/{}/", id)).await
    }

    pub async fn media(&self, lang: &str) -> Result<Vec<MediaItem>, ApiError> {
        let value: Value = self.get(&format!("/api/v1/media/?lang={}", lang)).await?;
        decode_list(value)
    }

    /// 某医生某天的可预约时段
    ///
    /// 显式匿名调用：预约表单在登录前也要能查可用时段。
    pub async fn availability(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, ApiError> {
        let path = format!(
            "/api/v1/appointments/availability/?doctor_id={}&date={}",
            doctor_id, date
        );
        let value: Value = self.get_with(&path, RequestOptions::anonymous()).await?;
        decode_list(value)
    }
}
