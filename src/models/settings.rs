//! provider 密钥与解析参数设置

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::provider::Provider;
use crate::error::ConfigError;

/// LlamaIndex 解析参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlamaIndexConfig {
    /// parse_page_with_agent 或 parse_page_with_llm
    pub parse_mode: String,
    pub model: String,
}

impl Default for LlamaIndexConfig {
    fn default() -> Self {
        Self {
            parse_mode: "parse_page_with_agent".to_string(),
            model: "openai-gpt-4-1-mini".to_string(),
        }
    }
}

/// Reducto 解析参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReductoConfig {
    /// standard（1 credit/页）或 complex（2 credits/页）
    pub mode: String,
    pub summarize_figures: bool,
}

impl Default for ReductoConfig {
    fn default() -> Self {
        Self {
            mode: "standard".to_string(),
            summarize_figures: false,
        }
    }
}

/// LandingAI 解析参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandingAIConfig {
    pub model: String,
}

impl Default for LandingAIConfig {
    fn default() -> Self {
        Self {
            model: "dpt-2".to_string(),
        }
    }
}

/// 设置文件内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// provider 名称 → API key，另可包含 openai
    pub api_keys: BTreeMap<String, String>,
    pub llamaindex: LlamaIndexConfig,
    pub reducto: ReductoConfig,
    pub landingai: LandingAIConfig,
    /// 离线估算用的 provider 名称 → 每 credit 美元价格，未配置时使用内置价格
    pub usd_per_credit: BTreeMap<String, f64>,
}

impl ProviderSettings {
    /// 获取 provider 的 API key，空字符串视为未配置
    pub fn api_key(&self, provider: Provider) -> Result<&str, ConfigError> {
        self.api_keys
            .get(provider.as_str())
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: provider.display_name().to_string(),
            })
    }

    /// 为一组 provider 收集 API key，任一缺失即报错
    pub fn api_keys_for(&self, providers: &[Provider]) -> Result<BTreeMap<String, String>, ConfigError> {
        providers
            .iter()
            .map(|p| Ok((p.as_str().to_string(), self.api_key(*p)?.to_string())))
            .collect()
    }

    /// 单个 provider 的解析参数（JSON 形式）
    pub fn config_for(&self, provider: Provider) -> Value {
        let value = match provider {
            Provider::LlamaIndex => serde_json::to_value(&self.llamaindex),
            Provider::Reducto => serde_json::to_value(&self.reducto),
            Provider::LandingAI => serde_json::to_value(&self.landingai),
        };
        value.unwrap_or(Value::Null)
    }

    pub fn configs_for(&self, providers: &[Provider]) -> BTreeMap<String, Value> {
        providers
            .iter()
            .map(|p| (p.as_str().to_string(), self.config_for(*p)))
            .collect()
    }

    /// 基准测试接口使用的密钥名（LandingAI 在后端叫 vision_agent）
    pub fn benchmark_api_keys(&self) -> Option<BTreeMap<String, String>> {
        let keys: BTreeMap<String, String> = self
            .api_keys
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| {
                let name = if k == "landingai" { "vision_agent" } else { k.as_str() };
                (name.to_string(), v.clone())
            })
            .collect();
        if keys.is_empty() {
            None
        } else {
            Some(keys)
        }
    }
}
