use crate::Result;
use crate::runtime::{SelectionSyncController, SyncContext};
use pivotsync_types::{ConversionResponse, CreateTableRequest, TableId, TableView};

/// Table lifecycle operations that keep the caches and the selection
/// state in step with the backend.
pub struct TableOps {
    ctx: SyncContext,
    controller: SelectionSyncController,
}

impl TableOps {
    pub fn new(ctx: SyncContext, controller: SelectionSyncController) -> Self {
        Self { ctx, controller }
    }

    /// Create a table and open its editor once its region is known.
    pub async fn create(&self, request: &CreateTableRequest) -> Result<TableView> {
        let view = self.ctx.api.create(request).await?;
        let id = view.id;
        log::info!("created {} table {}", self.ctx.kind(), id);
        self.ctx.views.set(id, view.clone());
        self.controller.table_created(id).await?;
        Ok(view)
    }

    pub async fn delete(&self, id: TableId) -> Result<()> {
        self.ctx.api.delete(id).await?;
        log::info!("deleted {} table {}", self.ctx.kind(), id);
        self.controller.table_deleted(id).await
    }

    /// Convert `id` to the other kind.
    ///
    /// The table leaves this kind's caches and pane; the extension of the
    /// other kind sees it under `new_id` on its next region refresh.
    pub async fn convert(&self, id: TableId) -> Result<ConversionResponse> {
        let response = self.ctx.api.convert(id).await?;
        log::info!(
            "converted {} table {} to {} table {}",
            self.ctx.kind(),
            id,
            self.ctx.kind().other(),
            response.new_id
        );
        if !response.migrated_detail_fields.is_empty() {
            log::info!(
                "detail fields moved to rows: {}",
                response.migrated_detail_fields.join(", ")
            );
        }
        self.controller.table_deleted(id).await?;
        Ok(response)
    }

    /// Re-read the source data of `id`.
    pub async fn refresh_cache(&self, id: TableId) -> Result<TableView> {
        let view = self.ctx.api.refresh_cache(id).await?;
        self.ctx.views.set(id, view.clone());
        self.controller.refresh_regions().await?;
        Ok(view)
    }

    /// Fetch and cache the current view of `id`.
    pub async fn view(&self, id: TableId) -> Result<TableView> {
        let view = self.ctx.api.view(id).await?;
        self.ctx.views.set(id, view.clone());
        Ok(view)
    }
}
