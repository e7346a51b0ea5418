use crate::adapters::DownstreamTokenCache;
use crate::core::matrix;
use crate::domain::model::{Matrix, RotateResponse, StatisticsResult};
use crate::domain::ports::{Credentials, StatisticsRelay};
use crate::utils::error::{RelayError, Result};

/// validate → diagonal check → rotate → relay → respond.
///
/// All-or-nothing: if the relay step fails the rotated matrix is dropped and
/// only the error is returned.
pub struct MatrixPipeline<R: StatisticsRelay> {
    relay: R,
    account: Credentials,
    token_cache: DownstreamTokenCache,
}

impl<R: StatisticsRelay> MatrixPipeline<R> {
    pub fn new(relay: R, account: Credentials) -> Self {
        Self {
            relay,
            account,
            token_cache: DownstreamTokenCache::disabled(),
        }
    }

    pub fn with_token_cache(mut self, token_cache: DownstreamTokenCache) -> Self {
        self.token_cache = token_cache;
        self
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub async fn run(&self, data: Matrix) -> Result<RotateResponse> {
        // 驗證失敗就不呼叫下游
        matrix::validate(&data)?;

        let original_diagonal = matrix::is_diagonal(&data);
        let rotated = matrix::rotate(&data);
        tracing::debug!(
            "🔄 Rotated {}x{} matrix (diagonal: {})",
            data.len(),
            data[0].len(),
            original_diagonal
        );

        let statistics = self
            .relay_statistics(&rotated, original_diagonal)
            .await?;

        Ok(RotateResponse {
            rotated_matrix: rotated,
            statistics,
        })
    }

    async fn relay_statistics(
        &self,
        rotated: &Matrix,
        original_diagonal: bool,
    ) -> std::result::Result<StatisticsResult, RelayError> {
        let identity = self.account.username.as_str();

        let (token, from_cache) = match self.token_cache.get(identity).await {
            Some(token) => (token, true),
            None => {
                let token = self
                    .relay
                    .authenticate(identity, &self.account.password)
                    .await?;
                self.token_cache.insert(identity, token.clone()).await;
                (token, false)
            }
        };

        match self
            .relay
            .send_statistics(rotated, original_diagonal, &token)
            .await
        {
            Ok(statistics) => Ok(statistics),
            Err(err) => {
                // 下游不再接受快取的 token，下次請求重新登入（本次不重試）
                if from_cache && err.is_rejected_token() {
                    self.token_cache.invalidate(identity).await;
                }
                Err(err)
            }
        }
    }
}
