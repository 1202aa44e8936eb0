//! Publish/schedule state machine for pages and layouts.
//!
//! Transitions: `draft → scheduled → published`, `published → draft`
//! (unpublish), `scheduled → draft` (unschedule). Every public transition
//! brackets its network calls with a progress begin/finish — begin before
//! the first request, finish after the last commit.
//!
//! Publishing a currently-scheduled page removes the schedule record
//! *first* and only then writes the published version; running the two
//! concurrently would let the server reinstate the scheduled state after
//! the publish.

use crate::error::StoreError;
use crate::mutations::Mutation;
use crate::store::Store;
use amphora_uri::{uri_to_url, url_to_uri, Version};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

impl Store {
    // --- page transitions ---

    pub async fn schedule_page(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.schedule_page_inner(at).await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn schedule_page_inner(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let uri = self.page_uri()?;
        let config = self.content.config();
        let publish_url = uri_to_url(&config.protocol, config.port, &uri)?;

        self.content
            .create_schedule(&self.options.site_prefix, at, &publish_url)
            .await?;

        let mut state = self.with_state(|s| s.page.state.clone());
        state.scheduled = true;
        state.scheduled_time = Some(at);
        self.commit(Mutation::UpdatePageState(state));
        debug!(uri = %uri, at = %at, "page scheduled");
        Ok(())
    }

    pub async fn unschedule_page(&self) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.unschedule_page_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn unschedule_page_inner(&self) -> Result<(), StoreError> {
        let uri = self.page_uri()?;
        self.content
            .remove_schedule(&self.options.site_prefix, &uri)
            .await?;

        let mut state = self.with_state(|s| s.page.state.clone());
        state.scheduled = false;
        state.scheduled_time = None;
        self.commit(Mutation::UpdatePageState(state));
        Ok(())
    }

    /// Write the draft page to its `@published` address. A scheduled page
    /// is unscheduled first, strictly sequentially.
    pub async fn publish_page(&self) -> Result<Option<String>, StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.publish_page_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn publish_page_inner(&self) -> Result<Option<String>, StoreError> {
        let uri = self.page_uri()?;
        let (scheduled, data) = self.with_state(|s| (s.page.state.scheduled, s.page.data.clone()));

        if scheduled {
            self.unschedule_page_inner().await?;
        }

        let response = self
            .content
            .save_version(&uri, &Version::Published, &data)
            .await?;
        let published_url = response
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut state = self.with_state(|s| s.page.state.clone());
        state.published = true;
        state.published_url = published_url.clone();
        state.publish_time = Some(Utc::now());
        self.commit(Mutation::UpdatePageState(state));

        info!(uri = %uri, url = ?published_url, "page published");
        Ok(published_url)
    }

    /// Remove the public url mapping for a published page and mark it
    /// draft again.
    pub async fn unpublish_page(&self) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.unpublish_page_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn unpublish_page_inner(&self) -> Result<(), StoreError> {
        let uri = self.page_uri()?;

        // recover the public url from the published version's metadata
        let published = self.content.get_version(&uri, &Version::Published).await?;
        if let Some(url) = published.get("url").and_then(Value::as_str) {
            let public_uri = url_to_uri(url)?;
            self.content
                .remove_uri_index(&self.options.site_prefix, &public_uri)
                .await?;
        }

        let mut state = self.with_state(|s| s.page.state.clone());
        state.published = false;
        state.published_url = None;
        state.publish_time = None;
        self.commit(Mutation::UpdatePageState(state));

        info!(uri = %uri, "page unpublished");
        Ok(())
    }

    // --- layout transitions ---

    pub async fn schedule_layout(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.schedule_layout_inner(at).await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn schedule_layout_inner(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let uri = self.layout_uri()?;
        let config = self.content.config();
        let publish_url = uri_to_url(&config.protocol, config.port, &uri)?;

        self.content
            .create_schedule(&self.options.site_prefix, at, &publish_url)
            .await?;

        let mut state = self.with_state(|s| s.layout.state.clone());
        state.scheduled = true;
        state.scheduled_time = Some(at);
        self.commit(Mutation::UpdateLayoutState(state));
        Ok(())
    }

    pub async fn unschedule_layout(&self) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.unschedule_layout_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn unschedule_layout_inner(&self) -> Result<(), StoreError> {
        let uri = self.layout_uri()?;
        self.content
            .remove_schedule(&self.options.site_prefix, &uri)
            .await?;

        let mut state = self.with_state(|s| s.layout.state.clone());
        state.scheduled = false;
        state.scheduled_time = None;
        self.commit(Mutation::UpdateLayoutState(state));
        Ok(())
    }

    pub async fn publish_layout(&self) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.publish_layout_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn publish_layout_inner(&self) -> Result<(), StoreError> {
        let uri = self.layout_uri()?;
        let scheduled = self.with_state(|s| s.layout.state.scheduled);

        if scheduled {
            self.unschedule_layout_inner().await?;
        }

        // the layout's draft lives server-side only; fetch it, then write
        // it to the published address
        let data = self.content.get_object(&uri).await?;
        self.content
            .save_version(&uri, &Version::Published, &data)
            .await?;

        let mut state = self.with_state(|s| s.layout.state.clone());
        state.published = true;
        state.publish_time = Some(Utc::now());
        self.commit(Mutation::UpdateLayoutState(state));

        info!(uri = %uri, "layout published");
        Ok(())
    }

    pub async fn unpublish_layout(&self) -> Result<(), StoreError> {
        self.commit(Mutation::StartProgress);
        let result = self.unpublish_layout_inner().await;
        self.commit(Mutation::FinishProgress);
        result
    }

    async fn unpublish_layout_inner(&self) -> Result<(), StoreError> {
        let uri = self.layout_uri()?;

        // layouts rarely carry a public url of their own; remove the index
        // record only when the published metadata names one
        let published = self.content.get_version(&uri, &Version::Published).await?;
        if let Some(url) = published.get("url").and_then(Value::as_str) {
            let public_uri = url_to_uri(url)?;
            self.content
                .remove_uri_index(&self.options.site_prefix, &public_uri)
                .await?;
        }

        let mut state = self.with_state(|s| s.layout.state.clone());
        state.published = false;
        state.published_url = None;
        state.publish_time = None;
        self.commit(Mutation::UpdateLayoutState(state));
        Ok(())
    }

    fn page_uri(&self) -> Result<String, StoreError> {
        let uri = self.with_state(|s| s.page.uri.clone());
        if uri.is_empty() {
            return Err(StoreError::NoPage);
        }
        Ok(uri)
    }

    fn layout_uri(&self) -> Result<String, StoreError> {
        let uri = self.with_state(|s| s.layout.uri.clone());
        if uri.is_empty() {
            return Err(StoreError::NoPage);
        }
        Ok(uri)
    }
}
