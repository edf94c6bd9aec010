//! Candle backend for Gemma-3 text generation.
//!
//! Reads a local Hugging Face snapshot (`config.json`, `tokenizer.json`,
//! and either `model.safetensors` or a sharded `model.safetensors.index.json`)
//! and binds it to a candle [`Device`] on request.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::gemma3::{Config as Gemma3Config, Model as Gemma3Model};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::backend::{Generator, GeneratorLoader};
use crate::device::DeviceKind;
use crate::error::{EngineError, GenerationError};
use crate::prompt::STOP_TOKENS;

const SINGLE_WEIGHTS_FILE: &str = "model.safetensors";
const WEIGHTS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Shape of `model.safetensors.index.json`; only the shard names matter.
#[derive(Deserialize)]
struct WeightsIndex {
    weight_map: std::collections::HashMap<String, String>,
}

/// Loads a Gemma-3 snapshot onto any [`DeviceKind`].
///
/// Config, tokenizer and weight paths are read once; each [`load`] call
/// memory-maps the weights for the requested device and precision.
///
/// [`load`]: GeneratorLoader::load
pub struct GemmaLoader {
    config: Gemma3Config,
    tokenizer: Arc<Tokenizer>,
    weight_files: Vec<PathBuf>,
    stop_token_ids: Vec<u32>,
    seed: u64,
}

impl GemmaLoader {
    /// Read the snapshot metadata from `model_dir`.
    pub fn from_dir(model_dir: &Path, seed: u64) -> Result<Self, EngineError> {
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path).map_err(|e| {
            EngineError::ModelFiles(format!("{}: {e}", config_path.display()))
        })?;
        let config: Gemma3Config = serde_json::from_str(&raw_config).map_err(|e| {
            EngineError::ModelFiles(format!("{}: {e}", config_path.display()))
        })?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EngineError::Tokenizer(format!("{}: {e}", tokenizer_path.display())))?;

        let stop_token_ids: Vec<u32> = STOP_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();
        if stop_token_ids.is_empty() {
            return Err(EngineError::Tokenizer(
                "tokenizer defines neither <eos> nor <end_of_turn>".to_string(),
            ));
        }

        let weight_files = weight_files(model_dir)?;
        tracing::info!(
            model_dir = %model_dir.display(),
            shards = weight_files.len(),
            layers = config.num_hidden_layers,
            "Model snapshot located"
        );

        Ok(Self {
            config,
            tokenizer: Arc::new(tokenizer),
            weight_files,
            stop_token_ids,
            seed,
        })
    }
}

impl GeneratorLoader for GemmaLoader {
    fn load(&self, kind: DeviceKind) -> Result<Box<dyn Generator>, EngineError> {
        let device = bind_device(kind)?;

        // SAFETY: the weight files are opened read-only and are not modified
        // while the process runs.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&self.weight_files, kind.dtype(), &device)?
        };
        let model = Gemma3Model::new(false, &self.config, vb)?;

        Ok(Box::new(GemmaGenerator {
            kind,
            device,
            model,
            tokenizer: Arc::clone(&self.tokenizer),
            stop_token_ids: self.stop_token_ids.clone(),
            seed: self.seed,
        }))
    }
}

/// Resolve `kind` to a concrete candle device.
fn bind_device(kind: DeviceKind) -> Result<Device, EngineError> {
    let unavailable = |reason: String| EngineError::DeviceUnavailable {
        device: kind,
        reason,
    };

    match kind {
        DeviceKind::Cuda => {
            if !candle_core::utils::cuda_is_available() {
                return Err(unavailable("built without CUDA support".to_string()));
            }
            Device::new_cuda(0).map_err(|e| unavailable(e.to_string()))
        }
        DeviceKind::Metal => {
            if !candle_core::utils::metal_is_available() {
                return Err(unavailable("built without Metal support".to_string()));
            }
            Device::new_metal(0).map_err(|e| unavailable(e.to_string()))
        }
        DeviceKind::Cpu => Ok(Device::Cpu),
    }
}

/// Collect the safetensors shards of a snapshot.
fn weight_files(model_dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let single = model_dir.join(SINGLE_WEIGHTS_FILE);
    if single.is_file() {
        return Ok(vec![single]);
    }

    let index_path = model_dir.join(WEIGHTS_INDEX_FILE);
    let raw_index = std::fs::read_to_string(&index_path).map_err(|_| {
        EngineError::ModelFiles(format!(
            "{} has neither {SINGLE_WEIGHTS_FILE} nor {WEIGHTS_INDEX_FILE}",
            model_dir.display()
        ))
    })?;
    let index: WeightsIndex = serde_json::from_str(&raw_index)
        .map_err(|e| EngineError::ModelFiles(format!("{}: {e}", index_path.display())))?;

    let shards: BTreeSet<String> = index.weight_map.into_values().collect();
    Ok(shards.into_iter().map(|s| model_dir.join(s)).collect())
}

/// A Gemma-3 model bound to one device.
struct GemmaGenerator {
    kind: DeviceKind,
    device: Device,
    model: Gemma3Model,
    tokenizer: Arc<Tokenizer>,
    stop_token_ids: Vec<u32>,
    seed: u64,
}

impl Generator for GemmaGenerator {
    fn device(&self) -> DeviceKind {
        self.kind
    }

    fn generate(&mut self, prompt: &str, max_new_tokens: usize) -> Result<String, GenerationError> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| GenerationError::Failed(format!("tokenization failed: {e}")))?;
        let mut tokens = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();

        self.model.clear_kv_cache();
        let mut logits_processor = LogitsProcessor::from_sampling(self.seed, Sampling::ArgMax);

        for index in 0..max_new_tokens {
            let context_size = if index > 0 { 1 } else { tokens.len() };
            let start_pos = tokens.len().saturating_sub(context_size);
            let input = Tensor::new(&tokens[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self.model.forward(&input, start_pos)?;
            let logits = logits.squeeze(0)?.squeeze(0)?.to_dtype(DType::F32)?;

            let next_token = logits_processor.sample(&logits)?;
            if self.stop_token_ids.contains(&next_token) {
                break;
            }
            tokens.push(next_token);
        }

        tracing::debug!(
            device = %self.kind,
            prompt_tokens = prompt_len,
            new_tokens = tokens.len() - prompt_len,
            "Generation finished"
        );

        self.tokenizer
            .decode(&tokens[prompt_len..], true)
            .map_err(|e| GenerationError::Failed(format!("detokenization failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_always_binds() {
        assert!(bind_device(DeviceKind::Cpu).is_ok());
    }

    #[test]
    fn missing_snapshot_is_reported_as_model_files_error() {
        let dir = std::env::temp_dir().join("nahw-engine-missing-snapshot");
        let err = GemmaLoader::from_dir(&dir, 0).err().unwrap();
        assert!(matches!(err, EngineError::ModelFiles(_)));
    }

    #[test]
    fn weight_files_reads_sharded_index() {
        let dir = std::env::temp_dir().join(format!("nahw-engine-index-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(WEIGHTS_INDEX_FILE),
            r#"{"metadata": {}, "weight_map": {
                "a": "model-00002-of-00002.safetensors",
                "b": "model-00001-of-00002.safetensors",
                "c": "model-00001-of-00002.safetensors"
            }}"#,
        )
        .unwrap();

        let files = weight_files(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(
            files,
            vec![
                dir.join("model-00001-of-00002.safetensors"),
                dir.join("model-00002-of-00002.safetensors"),
            ]
        );
    }
}
