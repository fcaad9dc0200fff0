use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Human-readable explanations of the generated plots (`plots/plot_expo.json`),
/// one entry per plot name. The dashboard's bar charts are fed from it.
#[derive(Debug, Clone)]
pub struct PlotNotes {
    path: PathBuf,
}

impl PlotNotes {
    pub fn new(plots_dir: impl AsRef<Path>) -> Self {
        Self {
            path: plots_dir.as_ref().join("plot_expo.json"),
        }
    }

    /// All explanations as a JSON object; `{}` when none were written yet
    /// or the file is unreadable.
    pub async fn load(&self) -> Value {
        async_fs::read_to_string(&self.path)
            .await
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Stores `explanation` under `plot_name`, keeping the other entries.
    ///
    /// Entries keep their insertion order; recording an existing name
    /// replaces its value in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the plots directory or the file cannot be written.
    pub async fn record(&self, plot_name: &str, explanation: Value) -> Result<(), StoreError> {
        let mut notes = self.load().await;
        if let Value::Object(map) = &mut notes {
            map.insert(plot_name.to_string(), explanation);
        }

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(&self.path, serde_json::to_string_pretty(&notes)?).await?;
        Ok(())
    }
}
