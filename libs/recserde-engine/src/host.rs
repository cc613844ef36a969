use std::collections::HashMap;
use std::sync::Arc;

use recserde_api::plugin::{RecordDeserializer, RecordSerializer, SerdePlugin};
use recserde_api::{GenericRecord, Schema, SerdeError};

use crate::config::{EngineConfig, SerdeConfig};
use crate::error::EngineError;

// ═══════════════════════════════════════════════════════════════
//  SerdeCatalog
// ═══════════════════════════════════════════════════════════════

/// Builds a fresh plugin instance.
pub type SerdeFactory = fn() -> Result<SerdePlugin, SerdeError>;

/// Serde plugins the engine can instantiate, by catalog name.
#[derive(Default)]
pub struct SerdeCatalog {
    factories: HashMap<String, SerdeFactory>,
}

impl SerdeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, name: impl Into<String>, factory: SerdeFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn create(&self, name: &str) -> Result<SerdePlugin, EngineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::SerdeNotFound(format!("no plugin named '{name}'")))?;
        Ok(factory()?)
    }
}

// ═══════════════════════════════════════════════════════════════
//  SerdeHost
// ═══════════════════════════════════════════════════════════════

/// A configured serde: the plugin name, its schema and the codecs it built.
struct SerdeInstance {
    plugin: String,
    schema: Arc<Schema>,
    deserializer: Box<dyn RecordDeserializer>,
    /// `None` for read-only plugins.
    serializer: Option<Box<dyn RecordSerializer>>,
}

/// Named serde instances, bootstrapped from configuration.
///
/// The engine hands raw bytes or records in by instance name and gets
/// records or bytes back. Codec failures come back as `EngineError::Serde`
/// with the instance name as context; nothing is retried.
pub struct SerdeHost {
    serdes: HashMap<String, SerdeInstance>,
}

impl SerdeHost {
    /// Instantiate every configured serde.
    ///
    /// Fails on the first unknown plugin, setting or duplicate instance
    /// name.
    pub fn bootstrap(config: &EngineConfig, catalog: &SerdeCatalog) -> Result<Self, EngineError> {
        let mut serdes = HashMap::new();
        for serde_cfg in &config.serdes {
            let ctx = format!("serde '{}'", serde_cfg.name);
            if serdes.contains_key(&serde_cfg.name) {
                return Err(EngineError::Config(format!(
                    "duplicate serde name '{}'",
                    serde_cfg.name
                )));
            }

            let instance = create_instance(serde_cfg, catalog).map_err(|e| e.with_context(&ctx))?;
            tracing::info!(
                serde = %serde_cfg.name,
                plugin = %serde_cfg.plugin,
                schema = %instance.schema.full_name(),
                writable = instance.serializer.is_some(),
                "created serde"
            );
            serdes.insert(serde_cfg.name.clone(), instance);
        }
        Ok(Self { serdes })
    }

    /// Decode `bytes` with the serde named `name`.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<GenericRecord, EngineError> {
        let instance = self.instance(name)?;
        instance.deserializer.deserialize(bytes).map_err(|e| {
            tracing::debug!(serde = %name, plugin = %instance.plugin, error = %e, "decode failed");
            EngineError::Serde(e.with_context(format!("serde '{name}'")))
        })
    }

    /// Encode `record` with the serde named `name`.
    ///
    /// Read-only serdes fail with `NotImplemented`.
    pub fn encode(&self, name: &str, record: &GenericRecord) -> Result<Vec<u8>, EngineError> {
        let instance = self.instance(name)?;
        let result = match &instance.serializer {
            Some(serializer) => serializer.serialize(record),
            None => Err(SerdeError::not_implemented(format!(
                "plugin '{}' is read-only",
                instance.plugin
            ))),
        };
        result.map_err(|e| {
            tracing::debug!(serde = %name, plugin = %instance.plugin, error = %e, "encode failed");
            EngineError::Serde(e.with_context(format!("serde '{name}'")))
        })
    }

    /// Schema of the records the serde named `name` produces.
    pub fn schema(&self, name: &str) -> Result<Arc<Schema>, EngineError> {
        Ok(Arc::clone(&self.instance(name)?.schema))
    }

    /// Names of all configured serdes, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.serdes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn instance(&self, name: &str) -> Result<&SerdeInstance, EngineError> {
        self.serdes
            .get(name)
            .ok_or_else(|| EngineError::SerdeNotFound(name.to_string()))
    }
}

impl std::fmt::Debug for SerdeHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerdeHost").field("serdes", &self.names()).finish()
    }
}

fn create_instance(serde_cfg: &SerdeConfig, catalog: &SerdeCatalog) -> Result<SerdeInstance, EngineError> {
    let plugin = catalog.create(&serde_cfg.plugin)?;
    reject_settings(serde_cfg.config.as_ref())?;

    let deserializer = plugin.deserializer()?;
    let serializer = if plugin.is_writable() {
        Some(plugin.serializer()?)
    } else {
        None
    };
    Ok(SerdeInstance {
        plugin: serde_cfg.plugin.clone(),
        schema: plugin.schema(),
        deserializer,
        serializer,
    })
}

/// Serde plugins take no settings: a `config` table must be empty.
fn reject_settings(config: Option<&toml::Value>) -> Result<(), EngineError> {
    match config {
        None => Ok(()),
        Some(toml::Value::Table(table)) => match table.keys().next() {
            Some(key) => Err(EngineError::Config(format!("unknown parameter '{key}'"))),
            None => Ok(()),
        },
        Some(_) => Err(EngineError::Config("plugin config must be a table".into())),
    }
}
