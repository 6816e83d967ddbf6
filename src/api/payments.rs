//! 支付编排（Payme / Click）
//! 预约创建后用暂存的标识初始化支付，拿到外部网关地址；
//! 用户从网关回来后对账并清理暂存

use crate::auth::session::ScratchKey;
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::payment::{PaymentInit, PaymentInitRequest, PaymentProvider, PaymentRecord};

impl ApiClient {
    /// 为暂存的进行中预约发起支付
    ///
    /// 成功后订单号写入暂存，外部跳转交给嵌入方。
    pub async fn init_payment(&self, provider: PaymentProvider) -> Result<PaymentInit, ApiError> {
        let appointment_id = self
            .store()
            .get_scratch(ScratchKey::AppointmentId)
            .await
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| ApiError::Config("no appointment in progress".to_string()))?;
        let amount = self
            .store()
            .get_scratch(ScratchKey::AppointmentPrice)
            .await
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| ApiError::Config("no stored appointment price".to_string()))?;

        let request = PaymentInitRequest {
            appointment_id,
            amount,
            provider,
        };
        let init: PaymentInit = self.post("/api/v1/payments/init/", &request).await?;

        self.store()
            .put_scratch(ScratchKey::PaymentOrderId, init.order_id.clone())
            .await;

        tracing::info!(
            appointment_id,
            order_id = %init.order_id,
            provider = %provider,
            "payment initiated"
        );
        Ok(init)
    }

    /// 对账：查询暂存订单的最终状态
    ///
    /// 没有进行中的订单时返回 `None`。查询成功后清掉整个预约/支付
    /// 暂存组，流程到此结束。
    pub async fn reconcile_payment(&self) -> Result<Option<PaymentRecord>, ApiError> {
        let Some(order_id) = self.store().get_scratch(ScratchKey::PaymentOrderId).await else {
            return Ok(None);
        };

        let record: PaymentRecord = self
            .get(&format!("/api/v1/payments/{}/", order_id))
            .await?;

        self.store().take_scratch(ScratchKey::PaymentOrderId).await;
        self.store().take_scratch(ScratchKey::AppointmentId).await;
        self.store().take_scratch(ScratchKey::AppointmentPrice).await;

        Ok(Some(record))
    }
}
