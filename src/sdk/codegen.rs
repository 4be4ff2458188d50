//! Code Generation Tools for BitCraps SDK

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Code generator for BitCraps SDK
pub struct CodeGenerator {
    template_engine: TemplateEngine,
    schema_generator: SchemaGenerator,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            template_engine: TemplateEngine::new(),
            schema_generator: SchemaGenerator::new(),
        }
    }

    /// Generate client bindings for a language
    pub fn generate_client_bindings(&self, language: &str, config: &GenerationConfig) -> Result<String, CodeGenError> {
        match language {
            "rust" => self.generate_rust_client(config),
            "typescript" => self.generate_typescript_client(config),
            "python" => self.generate_python_client(config),
            _ => Err(CodeGenError::UnsupportedLanguage(language.to_string())),
        }
    }

    fn generate_rust_client(&self, _config: &GenerationConfig) -> Result<String, CodeGenError> {
        Ok("// Rust client code".to_string())
    }

    fn generate_typescript_client(&self, _config: &GenerationConfig) -> Result<String, CodeGenError> {
        Ok("// TypeScript client code".to_string())
    }

    fn generate_python_client(&self, _config: &GenerationConfig) -> Result<String, CodeGenError> {
        Ok("# Python client code".to_string())
    }
}

/// Template engine for code generation
pub struct TemplateEngine {
    templates: HashMap<String, String>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn render(&self, template_name: &str, variables: &HashMap<String, String>) -> Result<String, TemplateError> {
        let template = self.templates.get(template_name)
            .ok_or_else(|| TemplateError::TemplateNotFound(template_name.to_string()))?;

        // Simple template rendering (in real implementation would use proper template engine)
        let mut result = template.clone();
        for (key, value) in variables {
            result = result.replace(&format!("{{{}}}", key), value);
        }

        Ok(result)
    }
}

/// Schema generator for API documentation
pub struct SchemaGenerator;

impl SchemaGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_openapi_schema(&self) -> Result<String, SchemaError> {
        let schema = r#"{
  "openapi": "3.0.0",
  "info": {
    "title": "BitCraps API",
    "version": "1.0.0"
  },
  "paths": {}
}"#;
        Ok(schema.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub package_name: String,
    pub version: String,
    pub author: String,
    pub features: Vec<String>,
}

#[derive(Debug)]
pub enum CodeGenError {
    UnsupportedLanguage(String),
    GenerationFailed(String),
    TemplateError(TemplateError),
}

#[derive(Debug)]
pub enum TemplateError {
    TemplateNotFound(String),
    RenderError(String),
}

#[derive(Debug)]
pub enum SchemaError {
    GenerationFailed(String),
}