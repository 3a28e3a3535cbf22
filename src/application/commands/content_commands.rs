//! Content Commands

/// 提交联系表单
#[derive(Debug, Clone)]
pub struct SubmitContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// 访问计数加一
#[derive(Debug, Clone)]
pub struct RecordVisit;
