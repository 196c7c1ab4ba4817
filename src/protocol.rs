//! Request/response envelope for driving the analyzer over a transport
//!
//! Requests are JSON objects of the form
//! `{"id": "...", "method": "analyze_class", "params": {"class_name": "AActor"}}`.
//! The `id` is optional on input; a fresh one is generated when absent.

use crate::analyzer::{Analyzer, InitSummary, SearchOptions};
use crate::core::error::Result;
use crate::extract::{ClassHierarchy, ClassInfo, CodeReference, ReferenceKind};
use crate::knowledge::{ApiQueryOptions, ApiQueryResult, CodePatternMatch, PatternInfo, SubsystemInfo};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Request sent to the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(flatten)]
    pub method: Method,
}

/// Available operations and their validated arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Method {
    InitializeEngine {
        path: PathBuf,
    },
    InitializeCustom {
        path: PathBuf,
    },
    AnalyzeClass {
        class_name: String,
    },
    FindClassHierarchy {
        class_name: String,
        #[serde(default = "default_true")]
        include_interfaces: bool,
    },
    FindReferences {
        identifier: String,
        #[serde(default)]
        kind: Option<ReferenceKind>,
    },
    SearchCode(SearchOptions),
    AnalyzeSubsystem {
        subsystem: String,
    },
    QueryApiReference {
        query: String,
        #[serde(default)]
        options: ApiQueryOptions,
    },
    DetectPatterns {
        file_path: PathBuf,
    },
    GetBestPractices {
        concept: String,
    },
}

/// Response to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Request ID this is responding to
    pub id: String,
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok { data: ResponseData },
    Error { message: String },
}

/// Response data variants, one per operation family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseData {
    Initialized(InitSummary),
    Class(ClassInfo),
    Hierarchy(ClassHierarchy),
    References(Vec<CodeReference>),
    Subsystem(SubsystemInfo),
    ApiReference(Vec<ApiQueryResult>),
    Patterns(Vec<CodePatternMatch>),
    BestPractices(PatternInfo),
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self { id: new_id(), method }
    }
}

impl Response {
    pub fn ok(id: String, data: ResponseData) -> Self {
        Self {
            id,
            result: ResponseResult::Ok { data },
        }
    }

    pub fn error(id: String, message: String) -> Self {
        Self {
            id,
            result: ResponseResult::Error { message },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.result, ResponseResult::Ok { .. })
    }
}

impl Analyzer {
    /// Run one operation
    pub async fn dispatch(&self, method: Method) -> Result<ResponseData> {
        let data = match method {
            Method::InitializeEngine { path } => {
                ResponseData::Initialized(self.initialize_engine(&path).await?)
            }
            Method::InitializeCustom { path } => {
                ResponseData::Initialized(self.initialize_custom(&path).await?)
            }
            Method::AnalyzeClass { class_name } => {
                ResponseData::Class(self.analyze_class(&class_name).await?)
            }
            Method::FindClassHierarchy {
                class_name,
                include_interfaces,
            } => ResponseData::Hierarchy(
                self.find_class_hierarchy(&class_name, include_interfaces)
                    .await?,
            ),
            Method::FindReferences { identifier, kind } => {
                ResponseData::References(self.find_references(&identifier, kind).await?)
            }
            Method::SearchCode(options) => {
                ResponseData::References(self.search_code(&options).await?)
            }
            Method::AnalyzeSubsystem { subsystem } => {
                ResponseData::Subsystem(self.analyze_subsystem(&subsystem).await?)
            }
            Method::QueryApiReference { query, options } => {
                ResponseData::ApiReference(self.query_api_reference(&query, &options).await?)
            }
            Method::DetectPatterns { file_path } => {
                ResponseData::Patterns(self.detect_patterns(&file_path).await?)
            }
            Method::GetBestPractices { concept } => {
                ResponseData::BestPractices(self.get_best_practices(&concept)?)
            }
        };
        Ok(data)
    }

    /// Run a request and wrap the outcome, errors included
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request.method).await {
            Ok(data) => Response::ok(request.id, data),
            Err(e) => Response::error(request.id, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    #[test]
    fn test_parse_request_with_defaults() {
        let request: Request = serde_json::from_str(
            r#"{"id": "1", "method": "find_class_hierarchy", "params": {"class_name": "AActor"}}"#,
        )
        .unwrap();
        assert_eq!(request.id, "1");
        assert_eq!(
            request.method,
            Method::FindClassHierarchy {
                class_name: "AActor".to_string(),
                include_interfaces: true,
            }
        );
    }

    #[test]
    fn test_missing_id_is_generated() {
        let request: Request = serde_json::from_str(
            r#"{"method": "search_code", "params": {"query": "Tick"}}"#,
        )
        .unwrap();
        assert_eq!(request.id.len(), 36);
        assert!(matches!(request.method, Method::SearchCode(ref o) if !o.include_comments));
    }

    #[test]
    fn test_reference_kind_is_lowercase() {
        let request: Request = serde_json::from_str(
            r#"{"method": "find_references", "params": {"identifier": "AActor", "kind": "class"}}"#,
        )
        .unwrap();
        assert!(matches!(
            request.method,
            Method::FindReferences { kind: Some(ReferenceKind::Class), .. }
        ));
    }

    #[tokio::test]
    async fn test_handle_wraps_errors() {
        let analyzer = Analyzer::new(Config::default());

        let response = analyzer
            .handle(Request::new(Method::AnalyzeClass {
                class_name: "AActor".to_string(),
            }))
            .await;
        assert!(!response.is_ok());
        match response.result {
            ResponseResult::Error { message } => assert!(message.contains("not initialized")),
            ResponseResult::Ok { .. } => panic!("expected an error"),
        }

        let response = analyzer
            .handle(Request::new(Method::GetBestPractices {
                concept: "UPROPERTY".to_string(),
            }))
            .await;
        assert!(response.is_ok());
    }
}
