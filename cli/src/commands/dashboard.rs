use backoffice::models::DashboardStatistics;
use backoffice::{Backoffice, BackofficeError};

use super::{emit, require_admin};

pub async fn statistics(app: &Backoffice) -> bool {
    emit(load(app).await)
}

async fn load(app: &Backoffice) -> Result<DashboardStatistics, BackofficeError> {
    require_admin(app, "/admin/dashboard")?;
    Ok(app.resources().dashboard.statistics().await?)
}
