//! Test harness: an in-process client over the full router plus factories that insert rows straight into the store.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use course_api::{app, AppState, Course, MemoryStore, NewCourse, NewStudent, Store, Student};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_max_students(20)
    }

    pub fn with_max_students(max_students: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), max_students);
        TestApp {
            store,
            router: app(state, 64 * 1024),
        }
    }

    /// Send a request and return the status plus the decoded JSON body (`Null` when empty).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn course_factory(&self, quantity: usize) -> Vec<Course> {
        let mut out = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let course = NewCourse {
                id: None,
                name: random_name("course"),
                students: vec![],
            };
            out.push(self.store.create_course(course).await.unwrap());
        }
        out
    }

    pub async fn student_factory(&self, quantity: usize) -> Vec<Student> {
        let mut out = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let student = NewStudent {
                id: None,
                name: random_name("student"),
                birth_date: None,
            };
            out.push(self.store.create_student(student).await.unwrap());
        }
        out
    }
}

pub fn random_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &suffix[..12])
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
