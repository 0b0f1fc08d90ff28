//! 对战（盲测）相关的数据结构

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 匿名标签与 provider 的对应关系
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BattleAssignment {
    pub label: String,
    pub provider: String,
}

/// 对战元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleMetadata {
    pub battle_id: String,
    #[serde(default)]
    pub page_number: Option<u32>,
    pub assignments: Vec<BattleAssignment>,
}

impl BattleMetadata {
    /// 本场对战的所有标签（按出现顺序）
    pub fn labels(&self) -> Vec<String> {
        self.assignments.iter().map(|a| a.label.clone()).collect()
    }

    /// 查找标签对应的 provider 名称
    pub fn provider_for(&self, label: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.label == label)
            .map(|a| a.provider.as_str())
    }
}

/// 用户的偏好选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Preference {
    A,
    B,
    BothGood,
    BothBad,
}

impl Preference {
    /// 转换为提交给后端的偏好标签数组
    pub fn preferred_labels(self) -> Vec<String> {
        match self {
            Preference::A => vec!["A".to_string()],
            Preference::B => vec!["B".to_string()],
            Preference::BothGood => vec!["A".to_string(), "B".to_string()],
            Preference::BothBad => Vec::new(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preference::A => "A",
            Preference::B => "B",
            Preference::BothGood => "BOTH_GOOD",
            Preference::BothBad => "BOTH_BAD",
        }
    }
}

impl std::str::FromStr for Preference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "A" => Ok(Preference::A),
            "B" => Ok(Preference::B),
            "BOTH_GOOD" | "BOTH" => Ok(Preference::BothGood),
            "BOTH_BAD" | "NEITHER" => Ok(Preference::BothBad),
            _ => Err(ConfigError::InvalidValue {
                name: "preference".to_string(),
                value: s.to_string(),
                reason: "可选 A, B, BOTH_GOOD, BOTH_BAD".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 反馈提交请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub battle_id: String,
    pub preferred_labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// 反馈提交响应，包含揭晓后的标签归属
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub battle_id: String,
    pub assignments: Vec<BattleAssignment>,
    #[serde(default)]
    pub message: Option<String>,
}
