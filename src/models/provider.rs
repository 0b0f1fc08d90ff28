use crate::error::ConfigError;

/// 文档解析 provider 枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// LlamaIndex (LlamaParse)
    LlamaIndex,
    /// Reducto
    Reducto,
    /// LandingAI (ADE)
    LandingAI,
}

impl Provider {
    /// 所有已支持的 provider
    pub const ALL: [Provider; 3] = [Provider::LlamaIndex, Provider::Reducto, Provider::LandingAI];

    /// 接口中使用的名称
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::LlamaIndex => "llamaindex",
            Provider::Reducto => "reducto",
            Provider::LandingAI => "landingai",
        }
    }

    /// 展示名称
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::LlamaIndex => "LlamaIndex",
            Provider::Reducto => "Reducto",
            Provider::LandingAI => "LandingAI",
        }
    }

    /// 从接口名称解析（忽略大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "llamaindex" | "llama_index" | "llamaparse" => Some(Provider::LlamaIndex),
            "reducto" => Some(Provider::Reducto),
            "landingai" | "landing_ai" => Some(Provider::LandingAI),
            _ => None,
        }
    }

    /// 把后端返回的 provider 名称转换为展示名称，未知名称原样返回
    pub fn display_name_of(name: &str) -> String {
        Self::from_name(name)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// 解析逗号分隔的 provider 列表，去重并保持顺序
    pub fn parse_list(input: &str) -> Result<Vec<Provider>, ConfigError> {
        let mut providers = Vec::new();
        for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let provider = Self::from_name(name).ok_or_else(|| ConfigError::UnknownProvider {
                name: name.to_string(),
            })?;
            if !providers.contains(&provider) {
                providers.push(provider);
            }
        }
        Ok(providers)
    }
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ConfigError::UnknownProvider { name: s.to_string() })
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
