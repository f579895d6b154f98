//! Integration tests for the validation handler
//!
//! These tests verify that:
//! - Valid input is coerced in place and the continuation proceeds
//! - Invalid input leaves the request untouched and routes an error
//! - Body is validated strictly before query
//! - The configured error kind and cleanup callback are honored

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use this_validation::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn person_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(Field::string("name").required())
        .field(Field::number("age").required().map_number(|age| age + 2.0))
}

fn bounded_person_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(Field::string("name").required())
        .field(
            Field::number("age")
                .required()
                .map_number(|age| age + 2.0)
                .min(3.0)
                .rule(Rule::max(5.0).with_message("Too old")),
        )
}

fn page_schema() -> ObjectSchema {
    ObjectSchema::new().field(Field::number("page").required().min(1.0))
}

/// Options every call of a [`CountingSchema`] received, in call order
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<ValidateOptions>>>);

impl Calls {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn options(&self) -> Vec<ValidateOptions> {
        self.0.lock().unwrap().clone()
    }
}

/// Schema wrapper recording every request to validate
struct CountingSchema {
    inner: ObjectSchema,
    calls: Calls,
}

impl CountingSchema {
    fn new(inner: ObjectSchema) -> (Self, Calls) {
        let calls = Calls::default();
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Schema for CountingSchema {
    async fn validate(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> std::result::Result<Value, ValidationRejection> {
        self.calls.0.lock().unwrap().push(options.clone());
        self.inner.validate(value, options).await
    }
}

/// Schema rejecting every value with the given messages
struct RejectingSchema(Vec<String>);

#[async_trait]
impl Schema for RejectingSchema {
    async fn validate(
        &self,
        _value: &Value,
        _options: &ValidateOptions,
    ) -> std::result::Result<Value, ValidationRejection> {
        Err(ValidationRejection::new(self.0.clone()))
    }
}

#[derive(Debug, PartialEq)]
struct CustomError(String);

/// Run `handler` and return the request and error seen by the continuation
async fn run<F: ErrorFactory>(
    handler: &ValidationHandler<F>,
    request: ValidationRequest,
) -> (ValidationRequest, Option<F::Error>, usize) {
    let calls = AtomicUsize::new(0);
    let (request, error) = handler
        .handle(request, (), |request, _res, error| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { (request, error) }
        })
        .await;
    (request, error, calls.load(Ordering::SeqCst))
}

// =============================================================================
// Success Path
// =============================================================================

mod success_tests {
    use super::*;

    #[tokio::test]
    async fn test_valid_body_is_coerced_and_proceeds() {
        let handler = validation_with(
            SchemaConfig::new().body(person_schema()),
            ValidationOptions::new().validate_options(ValidateOptions::collect_all()),
        );
        let request = ValidationRequest::with_body(json!({"name": "John", "age": 30}));

        let (request, error, calls) = run(&handler, request).await;

        assert_eq!(request.body, json!({"name": "John", "age": 32}));
        assert!(error.is_none());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_valid_query_is_coerced() {
        let handler = validation(SchemaConfig::new().query(page_schema()));
        let request = ValidationRequest::with_query(json!({"page": "3"}));

        let (request, error, _) = run(&handler, request).await;

        assert_eq!(request.query, json!({"page": 3}));
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_body_and_query_both_committed() {
        let handler = validation(
            SchemaConfig::new()
                .body(person_schema())
                .query(page_schema()),
        );
        let request = ValidationRequest::new(json!({"name": "Ann", "age": 1}), json!({"page": "2"}));

        let (request, error, _) = run(&handler, request).await;

        assert!(error.is_none());
        assert_eq!(request.body, json!({"name": "Ann", "age": 3}));
        assert_eq!(request.query, json!({"page": 2}));
    }

    #[tokio::test]
    async fn test_no_schema_proceeds_without_touching_request() {
        let handler = validation(SchemaConfig::new());
        let original = ValidationRequest::new(json!({"x": "1"}), json!({"y": "2"}));

        let (request, error, calls) = run(&handler, original.clone()).await;

        assert_eq!(request, original);
        assert!(error.is_none());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_factory_performs_no_validation() {
        let (schema, calls) = CountingSchema::new(person_schema());
        let _handler = validation(SchemaConfig::new().body(schema));
        assert_eq!(calls.count(), 0);
    }

    #[tokio::test]
    async fn test_validate_options_are_forwarded_to_every_schema() {
        let (body_schema, body_calls) = CountingSchema::new(person_schema());
        let (query_schema, query_calls) = CountingSchema::new(page_schema());
        let configured = ValidateOptions {
            abort_early: false,
            strip_unknown: true,
        };
        let handler = validation_with(
            SchemaConfig::new().body(body_schema).query(query_schema),
            ValidationOptions::new().validate_options(configured.clone()),
        );
        let request = ValidationRequest::new(
            json!({"name": "Ann", "age": 1, "admin": true}),
            json!({"page": "2", "sort": "name"}),
        );

        let (request, error, _) = run(&handler, request).await;

        assert!(error.is_none());
        assert_eq!(body_calls.options(), vec![configured.clone()]);
        assert_eq!(query_calls.options(), vec![configured]);
        assert_eq!(request.body, json!({"name": "Ann", "age": 3}));
        assert_eq!(request.query, json!({"page": 2}));
    }

    #[tokio::test]
    async fn test_continuation_output_is_returned() {
        let handler = validation(SchemaConfig::new().body(person_schema()));
        let request = ValidationRequest::with_body(json!({"name": "John", "age": 30}));

        let status = handler
            .handle(request, (), |_, _, error| async move {
                if error.is_none() { 200 } else { 400 }
            })
            .await;

        assert_eq!(status, 200);
    }
}

// =============================================================================
// Failure Path
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_body_routes_custom_error_and_keeps_body() {
        let handler = validation_with(
            SchemaConfig::new().body(bounded_person_schema()),
            ValidationOptions::new().error_factory(error_factory_fn(CustomError)),
        );
        let request = ValidationRequest::with_body(json!({"name": "John", "age": "6"}));

        let (request, error, calls) = run(&handler, request).await;

        assert_eq!(error, Some(CustomError("Too old".to_string())));
        assert_eq!(request.body, json!({"name": "John", "age": "6"}));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_default_error_kind_carries_message() {
        let handler = validation(SchemaConfig::new().body(bounded_person_schema()));
        let request = ValidationRequest::with_body(json!({"name": "John", "age": "6"}));

        let (_, error, _) = run(&handler, request).await;

        let error = error.expect("validation should fail");
        assert_eq!(error, ValidationError::new("Too old"));
        assert_eq!(error.to_string(), "Too old");
    }

    #[tokio::test]
    async fn test_body_failure_never_validates_query() {
        let (query_schema, query_calls) = CountingSchema::new(page_schema());
        let handler = validation(
            SchemaConfig::new()
                .body(bounded_person_schema())
                .query(query_schema),
        );
        let request = ValidationRequest::new(json!({"name": "John", "age": 9}), json!({"page": "2"}));

        let (request, error, _) = run(&handler, request).await;

        assert!(error.is_some());
        assert_eq!(query_calls.count(), 0);
        assert_eq!(request.query, json!({"page": "2"}));
        assert_eq!(request.body, json!({"name": "John", "age": 9}));
    }

    #[tokio::test]
    async fn test_query_failure_keeps_committed_body() {
        let handler = validation(
            SchemaConfig::new()
                .body(person_schema())
                .query(page_schema()),
        );
        let request = ValidationRequest::new(json!({"name": "Ann", "age": 1}), json!({"page": "0"}));

        let (request, error, _) = run(&handler, request).await;

        assert_eq!(
            error.map(|e| e.to_string()),
            Some("page must be greater than or equal to 1".to_string())
        );
        assert_eq!(request.body, json!({"name": "Ann", "age": 3}));
        assert_eq!(request.query, json!({"page": "0"}));
    }

    #[tokio::test]
    async fn test_only_query_configured_failure_keeps_query() {
        let handler = validation(SchemaConfig::new().query(page_schema()));
        let request = ValidationRequest::with_query(json!({"page": "zero"}));

        let (request, error, calls) = run(&handler, request).await;

        assert_eq!(
            error.map(|e| e.to_string()),
            Some("page must be a `number` type".to_string())
        );
        assert_eq!(request.query, json!({"page": "zero"}));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_body_errors_take_precedence_over_query_errors() {
        let handler = validation(
            SchemaConfig::new()
                .body(RejectingSchema(vec!["body is wrong".into()]))
                .query(RejectingSchema(vec!["query is wrong".into()])),
        );

        let (_, error, _) = run(&handler, ValidationRequest::new(json!({}), json!({}))).await;

        assert_eq!(error.map(|e| e.to_string()), Some("body is wrong".to_string()));
    }

    #[tokio::test]
    async fn test_messages_are_joined_with_commas() {
        let handler = validation_with(
            SchemaConfig::new().body(person_schema()),
            ValidationOptions::new().validate_options(ValidateOptions::collect_all()),
        );

        let (_, error, _) = run(&handler, ValidationRequest::with_body(json!({}))).await;

        assert_eq!(
            error.map(|e| e.to_string()),
            Some("name is a required field,age is a required field".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_rejection_still_fails() {
        let handler = validation(SchemaConfig::new().body(RejectingSchema(vec![])));

        let (_, error, calls) = run(&handler, ValidationRequest::with_body(json!({}))).await;

        assert_eq!(error, Some(ValidationError::new("")));
        assert_eq!(calls, 1);
    }
}

// =============================================================================
// Cleanup Callback
// =============================================================================

mod cleanup_tests {
    use super::*;

    fn counted_options() -> (ValidationOptions, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let cloned = Arc::clone(&count);
        let options = ValidationOptions::new().cleanup(move || {
            cloned.fetch_add(1, Ordering::SeqCst);
        });
        (options, count)
    }

    #[tokio::test]
    async fn test_cleanup_runs_once_on_success() {
        let (options, count) = counted_options();
        let handler = validation_with(SchemaConfig::new().body(person_schema()), options);

        let (_, error, _) = run(
            &handler,
            ValidationRequest::with_body(json!({"name": "John", "age": 30})),
        )
        .await;

        assert!(error.is_none());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleanup_runs_once_on_failure() {
        let (options, count) = counted_options();
        let handler = validation_with(SchemaConfig::new().body(person_schema()), options);

        let (_, error, _) = run(&handler, ValidationRequest::with_body(json!({}))).await;

        assert!(error.is_some());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleanup_runs_after_continuation() {
        let (options, count) = counted_options();
        let handler = validation_with(SchemaConfig::new(), options);
        let seen_in_continuation = Arc::clone(&count);

        let during = handler
            .handle(ValidationRequest::with_body(json!({})), (), |_, _, _| async move {
                seen_in_continuation.load(Ordering::SeqCst)
            })
            .await;

        assert_eq!(during, 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleanup_runs_per_invocation() {
        let (options, count) = counted_options();
        let handler = validation_with(SchemaConfig::new().body(person_schema()), options);

        for _ in 0..3 {
            run(&handler, ValidationRequest::with_body(json!({}))).await;
        }

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panicking_cleanup_does_not_mask_outcome() {
        let handler = validation_with(
            SchemaConfig::new().body(bounded_person_schema()),
            ValidationOptions::new()
                .error_factory(error_factory_fn(CustomError))
                .cleanup(|| panic!("cleanup exploded")),
        );

        let (_, error, calls) = run(
            &handler,
            ValidationRequest::with_body(json!({"name": "John", "age": "6"})),
        )
        .await;

        assert_eq!(error, Some(CustomError("Too old".to_string())));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_cleanup_runs_when_future_is_dropped() {
        let (options, count) = counted_options();
        let handler = validation_with(SchemaConfig::new(), options);

        let pending = handler.handle(ValidationRequest::with_body(json!({})), (), |_, _, _| {
            std::future::pending::<()>()
        });
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;

        assert!(timed_out.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_invocations_are_independent() {
        let handler = validation(SchemaConfig::new().body(person_schema()));

        let tasks: Vec<_> = (0..16)
            .map(|age| {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let request = ValidationRequest::with_body(json!({"name": "N", "age": age}));
                    handler
                        .handle(request, (), |request, _, error| async move {
                            assert!(error.is_none());
                            request.body["age"].as_i64()
                        })
                        .await
                })
            })
            .collect();

        for (age, task) in tasks.into_iter().enumerate() {
            assert_eq!(task.await.unwrap(), Some(age as i64 + 2));
        }
    }
}
