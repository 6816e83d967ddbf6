//! 预约流程

use crate::auth::session::ScratchKey;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::appointment::{Appointment, AppointmentRequest};
use crate::models::decode_list;
use serde_json::Value;

impl ApiClient {
    /// 创建预约
    ///
    /// 返回的预约 ID 和价格写进流程暂存，供随后的支付初始化使用；
    /// 登出会把它们一并清掉。
    pub async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        let appointment: Appointment = self.post("/api/v1/appointments/", request).await?;

        self.store()
            .put_scratch(ScratchKey::AppointmentId, appointment.id.to_string())
            .await;
        if let Some(price) = appointment.price {
            self.store()
                .put_scratch(ScratchKey::AppointmentPrice, price.to_string())
                .await;
        }

        tracing::info!(appointment_id = appointment.id, "appointment created");
        Ok(appointment)
    }

    /// 当前患者的预约列表
    pub async fn my_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let value: Value = self.get("/api/v1/appointments/").await?;
        decode_list(value)
    }

    /// 取消预约
    pub async fn cancel_appointment(&self, id: i64) -> Result<(), ApiError> {
        let _: Value = self.delete(&format!("/api/v1/appointments/{}/", id)).await?;
        Ok(())
    }
}
