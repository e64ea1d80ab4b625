//! Conversion between unified types and OpenAI wire types

use super::types::{OpenAIMessage, OpenAIRequest, OpenAIResponse, OpenAIStreamOptions};
use crate::error::{Error, Result};
use crate::types::{FinishReason, GenerateRequest, GenerateResponse, Message, Usage};

pub fn to_openai_request(req: &GenerateRequest, stream: bool) -> OpenAIRequest {
    OpenAIRequest {
        model: req.model.clone(),
        messages: req.messages.iter().map(to_openai_message).collect(),
        temperature: req.options.temperature,
        max_tokens: req.options.max_tokens,
        stream: stream.then_some(true),
        stream_options: stream.then_some(OpenAIStreamOptions {
            include_usage: true,
        }),
    }
}

fn to_openai_message(msg: &Message) -> OpenAIMessage {
    OpenAIMessage {
        role: msg.role.as_str().to_string(),
        content: Some(msg.content.clone()),
    }
}

pub fn from_openai_response(resp: OpenAIResponse) -> Result<GenerateResponse> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::provider_error("Response has no choices"))?;

    let usage = resp
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(GenerateResponse {
        id: resp.id,
        model: resp.model,
        text: choice.message.content.unwrap_or_default(),
        usage,
        finish_reason: FinishReason::parse(choice.finish_reason.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_request_roles_and_stream_flags() {
        let req = GenerateRequest::new(
            "gpt-4o",
            vec![Message::system("be brief"), Message::user("why?")],
        )
        .with_max_tokens(100);

        let wire = to_openai_request(&req, true);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "why?");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["stream"], true);
        assert_eq!(json["stream_options"]["include_usage"], true);

        let json = serde_json::to_value(to_openai_request(&req, false)).unwrap();
        assert!(json.get("stream").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_from_response() {
        let resp: OpenAIResponse = serde_json::from_str(
            r#"{"id":"r1","model":"gpt-4o","choices":[{"index":0,"message":{"role":"assistant","content":"Fix it"},"finish_reason":"stop"}],"usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}"#,
        )
        .unwrap();
        let out = from_openai_response(resp).unwrap();
        assert_eq!(out.text, "Fix it");
        assert_eq!(out.usage.total_tokens, 15);
        assert_eq!(out.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn test_from_response_without_choices() {
        let resp: OpenAIResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(from_openai_response(resp).is_err());
    }
}
