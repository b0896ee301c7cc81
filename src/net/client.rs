use crate::memory::{
    address_space::SpaceStats,
    allocator::AllocationStrategy,
    block::{MemoryBlock, ProcessId},
};
use crate::net::server::{
    AccessBody, AllocateBody, AllocateResponse, DeallocateBody, DeallocateResponse, ErrorBody,
    ResetBody,
};
use crate::paging::{
    frame_table::{AccessResult, PageId},
    replacement::PagingPolicy,
};
use crate::session::PagingStats;
use anyhow::{Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// HTTP client for a remote simulation session.
pub struct SimClient {
    http: Client,
    base_url: String,
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(body) => Err(anyhow!("{} ({})", body.message, body.kind)),
        Err(_) => Err(anyhow!("Server returned {}", status)),
    }
}

impl SimClient {
    pub fn new(base_url: &str) -> Self {
        SimClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn allocate(
        &self,
        strategy: AllocationStrategy,
        pid: ProcessId,
        size: usize,
    ) -> Result<usize> {
        let resp = self
            .http
            .post(self.url("/allocate"))
            .json(&AllocateBody {
                strategy,
                pid,
                size,
            })
            .send()
            .await?;
        let body: AllocateResponse = decode(resp).await?;
        Ok(body.address)
    }

    pub async fn deallocate(&self, pid: ProcessId) -> Result<usize> {
        let resp = self
            .http
            .post(self.url("/deallocate"))
            .json(&DeallocateBody { pid })
            .send()
            .await?;
        let body: DeallocateResponse = decode(resp).await?;
        Ok(body.freed)
    }

    pub async fn snapshot(&self) -> Result<Vec<MemoryBlock>> {
        decode(self.http.get(self.url("/snapshot")).send().await?).await
    }

    pub async fn stats(&self) -> Result<SpaceStats> {
        decode(self.http.get(self.url("/stats")).send().await?).await
    }

    pub async fn access_page(&self, policy: PagingPolicy, page: PageId) -> Result<AccessResult> {
        let resp = self
            .http
            .post(self.url("/access"))
            .json(&AccessBody { policy, page })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn paging_stats(&self) -> Result<PagingStats> {
        decode(self.http.get(self.url("/paging/stats")).send().await?).await
    }

    pub async fn frames(&self) -> Result<Vec<Option<PageId>>> {
        decode(self.http.get(self.url("/frames")).send().await?).await
    }

    pub async fn reset_paging(&self, frames: Option<usize>) -> Result<Vec<Option<PageId>>> {
        let resp = self
            .http
            .post(self.url("/paging/reset"))
            .json(&ResetBody { frames })
            .send()
            .await?;
        decode(resp).await
    }
}
