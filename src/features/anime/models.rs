use serde::{Deserialize, Serialize};

/// 动画条目，唯一的领域实体。
///
/// `id` 由仓储在持久化时分配，创建请求中应当缺省；
/// `name` 为必填且非空，约束在服务边界校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Anime {
    /// 服务端分配的唯一 ID
    #[serde(default)]
    #[schema(example = 1)]
    pub id: Option<i64>,

    /// 名称（必填，非空；缺省时按空串处理并在服务边界被拒绝）
    #[serde(default)]
    #[schema(example = "Dragon Ball")]
    pub name: String,
}

impl Anime {
    /// 构造一个尚未持久化的条目
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// 覆盖 id 后返回自身（更新路径用路径参数中的 id 覆盖请求体）
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}
