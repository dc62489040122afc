use std::cell::RefCell;

use chrono::NaiveDate;
use serde_json::json;

use synthtab_core::{Column, ColumnType, ColumnValue, Header};
use synthtab_generate::output::csv::{read_csv_rows, to_csv_string, write_columns_csv};
use synthtab_generate::{
    GenerateOptions, GenerationEngine, GeneratorConfiguration, LocaleKey, Session,
    SynthesisError, SynthesisRequest, SynthesisResponse, SynthesisService, synthesize_csv,
};

fn engine() -> GenerationEngine {
    GenerationEngine::new(GenerateOptions {
        seed: Some(42),
        locale: LocaleKey::EnUs,
        today: NaiveDate::from_ymd_opt(2024, 6, 15),
    })
}

fn age_config() -> GeneratorConfiguration {
    let mut config = GeneratorConfiguration::for_type(ColumnType::Age);
    config.set_age_range_min(20.0).set_age_range_max(30.0);
    config
}

#[test]
fn session_starts_with_one_placeholder_column() {
    let session = Session::new();
    assert_eq!(
        session.headers(),
        vec![Header::Empty {
            name: "Header".to_string()
        }]
    );
    assert_eq!(session.preview_rows(), vec![vec![None]]);
    assert!(session.csv_records().is_empty());
}

#[test]
fn generated_column_is_committed_with_its_name() {
    let mut session = Session::new();
    session.set_column_name(0, "age").expect("rename");
    let column = session
        .generate_column(0, 25, &age_config(), &engine())
        .expect("generate");
    assert_eq!(column.name, "age");
    assert_eq!(column.values.len(), 25);
    assert_eq!(session.columns_for_type(ColumnType::Age).len(), 1);
    assert_eq!(session.numeric_columns().len(), 1);
}

#[test]
fn rejected_generation_leaves_session_untouched() {
    let mut session = Session::new();
    let before = session.clone();
    let mut config = GeneratorConfiguration::for_type(ColumnType::Uniform);
    config.set_uniform_min(5.0).set_uniform_max(1.0);

    let errors = session
        .generate_column(0, 10, &config, &engine())
        .expect_err("min above max");
    assert_eq!(errors.len(), 1);
    assert_eq!(session, before);
}

#[test]
fn out_of_range_index_is_an_internal_error() {
    let mut session = Session::new();
    let errors = session
        .generate_column(3, 10, &age_config(), &engine())
        .expect_err("no such column");
    assert!(errors.has_internal());
    assert!(session.delete_column(3).is_err());
}

#[test]
fn later_columns_correlate_to_earlier_ones() {
    let engine = engine();
    let mut session = Session::new();
    session.set_column_name(0, "age").expect("rename");
    session
        .generate_column(0, 12, &age_config(), &engine)
        .expect("ages");

    let index = session.add_new_column();
    session.set_column_name(index, "born").expect("rename");
    let mut config = GeneratorConfiguration::for_type(ColumnType::Dob);
    config.set_age_correlates_to(Some("age".to_string()));
    let column = session
        .generate_column(index, 1, &config, &engine)
        .expect("dates");
    assert_eq!(column.values.len(), 12);
}

#[test]
fn regenerating_a_column_does_not_correlate_to_itself() {
    let engine = engine();
    let mut session = Session::new();
    session.set_column_name(0, "age").expect("rename");
    session
        .generate_column(0, 5, &age_config(), &engine)
        .expect("ages");

    let mut config = GeneratorConfiguration::for_type(ColumnType::Correlated);
    config
        .set_correlated_correlates_to("age")
        .set_correlated_gradient(1.0)
        .set_correlated_c(0.0)
        .set_correlated_loc(0.0)
        .set_correlated_standard_deviation(1.0);
    let errors = session
        .generate_column(0, 5, &config, &engine)
        .expect_err("own values are not a source");
    assert!(errors.has_internal());
}

#[test]
fn deleting_and_renaming_columns() {
    let mut session = Session::new();
    let index = session.add_new_column();
    session.set_column_name(index, "second").expect("rename");
    let removed = session.delete_column(0).expect("delete");
    assert_eq!(removed.name(), "Header");
    assert_eq!(session.columns().len(), 1);
    assert_eq!(session.columns()[0].name(), "second");
}

#[test]
fn new_columns_get_distinct_default_names() {
    let mut session = Session::new();
    let second = session.add_new_column();
    session.add_new_column();
    let names: Vec<&str> = session.columns().iter().map(Column::name).collect();
    assert_eq!(names, vec!["Header", "Header 2", "Header 3"]);

    session.delete_column(second).expect("delete");
    session.set_column_name(0, "first").expect("rename");
    assert_eq!(session.add_new_column(), 2);
    let names: Vec<&str> = session.columns().iter().map(Column::name).collect();
    assert_eq!(names, vec!["first", "Header 3", "Header"]);
}

#[test]
fn renaming_onto_another_column_name_is_rejected() {
    let mut session = Session::new();
    let index = session.add_new_column();
    let errors = session
        .set_column_name(index, "Header")
        .expect_err("name taken");
    assert_eq!(
        errors.messages(),
        vec!["name: column name 'Header' is already used by column 0".to_string()]
    );
    assert!(!errors.has_internal());
    assert_eq!(session.columns()[index].name(), "Header 2");

    session.set_column_name(0, "Header").expect("keeping its own name");
}

#[test]
fn default_named_columns_correlate_to_the_intended_source() {
    let engine = engine();
    let mut session = Session::new();
    session
        .generate_column(0, 4, &age_config(), &engine)
        .expect("ages");
    let names = session.add_new_column();
    session
        .generate_column(
            names,
            4,
            &GeneratorConfiguration::for_type(ColumnType::Name),
            &engine,
        )
        .expect("names");

    let sources = session.columns_for_type(ColumnType::Name);
    assert_eq!(sources.len(), 1);
    let source = sources[0].name.clone();
    assert_eq!(source, "Header 2");

    let emails = session.add_new_column();
    let mut config = GeneratorConfiguration::for_type(ColumnType::Email);
    config.set_email_correlates_to(Some(source));
    let column = session
        .generate_column(emails, 1, &config, &engine)
        .expect("emails from the name column");
    assert_eq!(column.values.len(), 4);
    assert!(
        column
            .values
            .iter()
            .all(|value| value.as_str().is_some_and(|email| email.contains('@')))
    );
}

#[test]
fn export_skips_empty_columns_and_pads_shorter_ones() {
    let engine = engine();
    let mut session = Session::new();
    session.set_column_name(0, "age").expect("rename");
    session
        .generate_column(0, 3, &age_config(), &engine)
        .expect("ages");
    session.add_new_column();
    let index = session.add_new_column();
    session.set_column_name(index, "label").expect("rename");
    let mut config = GeneratorConfiguration::for_type(ColumnType::Categorical);
    config.add_category("only", None);
    session
        .generate_column(index, 2, &config, &engine)
        .expect("labels");

    let text = to_csv_string(session.columns()).expect("export");
    let rows = read_csv_rows(&text).expect("parse export");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], vec!["age".to_string(), "label".to_string()]);
    assert_eq!(rows[1][1], "only");
    assert_eq!(rows[3][1], "");

    let mut buffer = Vec::new();
    let written = write_columns_csv(&mut buffer, session.columns()).expect("write");
    assert_eq!(written as usize, buffer.len());
    assert_eq!(buffer, text.into_bytes());
}

#[test]
fn numbers_export_with_default_formatting() {
    let columns = vec![Column::Generated(synthtab_core::GeneratedColumn {
        name: "n".to_string(),
        column_type: ColumnType::Uniform,
        values: vec![ColumnValue::Number(30.0), ColumnValue::from("1.50")],
    })];
    assert_eq!(to_csv_string(&columns).expect("export"), "n\n30\n1.50\n");
}

#[test]
fn uploaded_tables_become_unknown_columns() {
    let rows = read_csv_rows("a,b\n1,2\n3,4\n").expect("parse");
    let mut session = Session::new();
    session.load_table(&rows).expect("load");
    assert_eq!(
        session.headers(),
        vec![
            Header::Unknown {
                name: "a".to_string()
            },
            Header::Unknown {
                name: "b".to_string()
            },
        ]
    );
    assert!(session.generated_columns().is_empty());
    assert_eq!(session.csv_records().len(), 3);
}

struct EchoService {
    seen: RefCell<Option<SynthesisRequest>>,
}

impl SynthesisService for EchoService {
    fn increase(&self, request: &SynthesisRequest) -> Result<SynthesisResponse, SynthesisError> {
        self.seen.replace(Some(request.clone()));
        Ok(SynthesisResponse {
            response: vec![vec![json!("5"), json!(6)]; request.add_samples as usize],
        })
    }
}

struct FailingService;

impl SynthesisService for FailingService {
    fn increase(&self, _request: &SynthesisRequest) -> Result<SynthesisResponse, SynthesisError> {
        Err(SynthesisError::Service("status 502".to_string()))
    }
}

#[test]
fn synthesized_rows_follow_uploaded_rows() {
    let service = EchoService {
        seen: RefCell::new(None),
    };
    let csv = synthesize_csv("a,b\n1,2\n3,4\n", 2, &service).expect("synthesize");
    assert_eq!(csv, "a,b\n1,2\n3,4\n5,6\n5,6\n");

    let request = service.seen.into_inner().expect("service called");
    assert_eq!(request.columns.len(), 2);
    assert_eq!(
        serde_json::to_value(&request).expect("serialize"),
        json!({ "columns": [["1", "2"], ["3", "4"]], "addSamples": 2 })
    );
}

#[test]
fn synthesis_failures_surface_as_one_error() {
    assert!(matches!(
        synthesize_csv("a\n1\n", 1, &FailingService),
        Err(SynthesisError::Service(_))
    ));
    assert!(matches!(
        synthesize_csv("a\n1\n", 0, &FailingService),
        Err(SynthesisError::InvalidSamples)
    ));
    assert!(matches!(
        SynthesisResponse::from_json("{\"rows\": []}"),
        Err(SynthesisError::MalformedResponse(_))
    ));
}
