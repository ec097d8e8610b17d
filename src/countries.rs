//! Reference data readable by admins only.

use crate::client::RemoteClient;
use crate::config::PanelConfig;
use crate::error::QueryError;
use crate::model::Country;

/// Reads the country list. Only called once the gate has authorized an admin.
pub async fn list_countries<C: RemoteClient + ?Sized>(
    client: &C,
    config: &PanelConfig,
) -> Result<Vec<Country>, QueryError> {
    let rows = client.select(config.countries_table(), "*").await?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| QueryError::new(format!("country row could not be decoded: {e}")))
        })
        .collect()
}
