use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{DomainError, DomainResult};

use crate::domain::nlp::edits::{parse_edit_list, ScheduleEdit};
use crate::domain::nlp::oracle::{ModificationOracle, OracleRequest};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Production oracle backed by the Anthropic Messages API.
pub struct AnthropicOracle {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicOracle {
    /// Read the credential from `ANTHROPIC_API_KEY`. A missing key or the
    /// `.env` placeholder means the NL patch feature is not configured.
    pub fn from_env(model: impl Into<String>) -> DomainResult<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        if api_key.is_empty() || api_key == "your-api-key-here" {
            return Err(DomainError::NlpNotConfigured);
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        })
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ModificationOracle for AnthropicOracle {
    async fn parse_instruction(&self, request: OracleRequest) -> DomainResult<Vec<ScheduleEdit>> {
        let prompt = build_prompt(&request);
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::OracleFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::OracleFailure(format!(
                "messages API returned {status}: {detail}"
            )));
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::OracleFailure(e.to_string()))?;
        let text = payload
            .content
            .first()
            .map(|block| block.text.as_str())
            .unwrap_or_default();

        parse_edit_list(text)
    }
}

fn build_prompt(request: &OracleRequest) -> String {
    format!(
        r#"あなたはシフト修正指示を解析するアシスタントです。
ユーザーの指示を読み、必要最小限の変更だけをJSON配列で出力してください。

## 対象スケジュール月
{target_month}
※ ユーザーが「3/2」と言った場合、日付は「{target_month}-02」です。月と年は必ずこの対象月に合わせてください。

## ユーザーの修正指示
{instruction}

## 現在のシフト概要
{current_summary}

## 現在の日別スケジュール
{schedule_detail}

## 出力形式

2種類の変更タイプがあります。指示内容に応じて適切なタイプを選んでください。

### タイプ1: pin（特定日の直接変更）— 最も一般的
特定のスタッフの特定日を変更する場合に使います。
{{
  "type": "pin",
  "employee_name": "スタッフ名",
  "date": "YYYY-MM-DD",
  "new_job_type": "職人" / "サブ職人" / "データ" / "その他" / "休み"
}}

### タイプ2: adjust（集計的な変更）
「もっとデータを増やして」のような日付を指定しない調整に使います。
{{
  "type": "adjust",
  "employee_name": "スタッフ名",
  "job_type": "職人" / "サブ職人" / "データ" / "その他",
  "action": "increase" / "decrease" / "set",
  "amount": 数値またはnull
}}

## 重要なルール
- employee_nameは現在のシフト情報に含まれるフルネームを出力してください。ユーザーが苗字だけで指定した場合、シフト情報からフルネームを探して出力してください
- 「サブ」→「サブ職人」、「データ」→「データ」、「職人」→「職人」のように正式名称にしてください
- 「休みにして」「休日にして」「オフにして」→ new_job_type は "休み"
- 複数の指示がある場合、前の文脈で日付が言及されていれば、日付が省略された指示にもその日付を適用してください
- 指示された変更だけを出力してください。指示されていない変更は絶対に含めないでください
- 「それ以外は変更しない」等の指示がある場合は特に注意してください
- すべての指示を漏れなく出力してください。指示を無視しないでください
- JSON配列のみを出力してください。説明文は不要です。"#,
        target_month = request.target_month,
        instruction = request.instruction,
        current_summary = request.current_summary,
        schedule_detail = request.schedule_detail,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_all_four_inputs() {
        let prompt = build_prompt(&OracleRequest {
            instruction: "大野千絵美の3/5をその他に変更".to_string(),
            current_summary: "- 大野千絵美: 出勤20日 (職人: 10日)".to_string(),
            schedule_detail: "大野千絵美: 3/2=職人, 3/3=休み".to_string(),
            target_month: "2026-03".to_string(),
        });
        assert!(prompt.contains("2026-03"));
        assert!(prompt.contains("大野千絵美の3/5をその他に変更"));
        assert!(prompt.contains("出勤20日"));
        assert!(prompt.contains("3/3=休み"));
    }
}
