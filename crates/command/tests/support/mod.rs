//! Command fixtures shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use cmdkit_command::prelude::*;
use serde::Serialize;
use serde_json::Value;

/// Wire a command's embedded `state` field into the trait.
macro_rules! command_state {
    ($output:ty) => {
        type Output = $output;

        fn state(&self) -> &CommandState<$output> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut CommandState<$output> {
            &mut self.state
        }
    };
}

pub fn init_tracing() {
    cmdkit_observability::init_for_tests();
}

#[derive(Debug, thiserror::Error)]
#[error("boom")]
pub struct Boom;

#[derive(Debug, thiserror::Error)]
#[error("gateway timed out after {0}ms")]
pub struct Timeout(pub u64);

#[derive(Debug, thiserror::Error)]
#[error("charge failed")]
pub struct ChargeFailed {
    #[source]
    pub source: Timeout,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SuccessfulCommand {
    state: CommandState<&'static str>,
    pub executions: u32,
}

impl Command for SuccessfulCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        self.executions += 1;
        Ok("result")
    }
}

pub struct AuthorizedCommand {
    state: CommandState<&'static str>,
    allow: bool,
    pub executions: u32,
}

impl AuthorizedCommand {
    pub fn new(allow: bool) -> Self {
        Self {
            state: CommandState::default(),
            allow,
            executions: 0,
        }
    }
}

impl Command for AuthorizedCommand {
    command_state!(&'static str);

    fn authorized(&self) -> bool {
        self.allow
    }

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        self.executions += 1;
        Ok("result")
    }
}

pub struct ValidatedCommand {
    state: CommandState<String>,
    pub executions: u32,
}

impl Command for ValidatedCommand {
    command_state!(String);

    fn validations(&self) -> Validations<Self> {
        Validations::new()
            .presence("name")
            .length("name", Length::minimum(2))
            .inclusion("plan", ["free", "pro"])
    }

    fn execute(&mut self) -> anyhow::Result<String> {
        self.executions += 1;
        Ok(self.attributes().get_as("name")?)
    }
}

impl FromAttributes for ValidatedCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new()
            .attribute("name")
            .attribute_with_default("plan", "free")
    }

    fn from_attributes(attributes: Attributes) -> Self {
        Self {
            state: CommandState::new(attributes),
            executions: 0,
        }
    }
}

/// A domain object that validates itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub errors: Errors,
}

impl Person {
    pub fn new(name: &str) -> Self {
        let mut errors = Errors::new();
        if name.chars().count() < 3 {
            errors.add("name", "is too short (minimum is 3 characters)");
        }
        Self {
            name: name.to_string(),
            errors,
        }
    }
}

impl ExposesErrors for Person {
    fn errors_view(&self) -> ErrorsView<'_> {
        ErrorsView::Recognized(&self.errors)
    }
}

pub struct ValidatedResultCommand {
    state: CommandState<Person>,
}

impl Command for ValidatedResultCommand {
    command_state!(Person);

    fn execute(&mut self) -> anyhow::Result<Person> {
        let name: String = self.attributes().get_as("name")?;
        Ok(Person::new(&name))
    }
}

impl FromAttributes for ValidatedResultCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new().attribute("name")
    }

    fn from_attributes(attributes: Attributes) -> Self {
        Self {
            state: CommandState::new(attributes),
        }
    }
}

/// A result reporting errors as plain strings.
pub struct LegacyRecord {
    pub errors: Vec<String>,
}

impl ExposesErrors for LegacyRecord {
    fn errors_view(&self) -> ErrorsView<'_> {
        ErrorsView::unrecognized::<Vec<String>>()
    }
}

#[derive(Default)]
pub struct UnsupportedErrorsCommand {
    state: CommandState<LegacyRecord>,
}

impl Command for UnsupportedErrorsCommand {
    command_state!(LegacyRecord);

    fn execute(&mut self) -> anyhow::Result<LegacyRecord> {
        Ok(LegacyRecord {
            errors: vec!["name is missing".to_string()],
        })
    }
}

pub struct NoopCommand {
    state: CommandState<&'static str>,
    skip: bool,
    pub executions: u32,
}

impl NoopCommand {
    pub fn new(skip: bool) -> Self {
        Self {
            state: CommandState::default(),
            skip,
            executions: 0,
        }
    }
}

impl Command for NoopCommand {
    command_state!(&'static str);

    fn noop(&self) -> bool {
        self.skip
    }

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        self.executions += 1;
        Ok("result")
    }
}

/// Records every pipeline stage it reaches.
pub struct StagedCommand {
    state: CommandState<&'static str>,
    allow: bool,
    hook_error: Option<&'static str>,
    pub stages: RefCell<Vec<&'static str>>,
}

impl StagedCommand {
    pub fn new(allow: bool, hook_error: Option<&'static str>) -> Self {
        Self {
            state: CommandState::default(),
            allow,
            hook_error,
            stages: RefCell::new(Vec::new()),
        }
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.stages.borrow().clone()
    }
}

impl Command for StagedCommand {
    command_state!(&'static str);

    fn authorized(&self) -> bool {
        self.allow
    }

    fn before_validation(&mut self) {
        self.stages.borrow_mut().push("before_validation");
        if let Some(message) = self.hook_error {
            self.state_mut().errors_mut().add(ErrorKey::Base, message);
        }
    }

    fn validations(&self) -> Validations<Self> {
        Validations::new().validate_with(|command: &Self, _: &mut Errors| {
            command.stages.borrow_mut().push("validation");
        })
    }

    fn noop(&self) -> bool {
        self.stages.borrow_mut().push("noop");
        false
    }

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        self.stages.borrow_mut().push("execute");
        Ok("result")
    }
}

#[derive(Default)]
pub struct NotImplementedCommand {
    state: CommandState<()>,
}

impl Command for NotImplementedCommand {
    command_state!(());
}

/// Normalizes its input right after construction.
pub struct AfterInitializeCommand {
    state: CommandState<String>,
}

impl Command for AfterInitializeCommand {
    command_state!(String);

    fn execute(&mut self) -> anyhow::Result<String> {
        Ok(self.attributes().get_as("email")?)
    }
}

impl FromAttributes for AfterInitializeCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new().attribute("email")
    }

    fn from_attributes(mut attributes: Attributes) -> Self {
        if let Some(email) = attributes.get("email").and_then(Value::as_str) {
            let normalized = email.trim().to_lowercase();
            attributes
                .set("email", normalized)
                .expect("email is declared");
        }
        Self {
            state: CommandState::new(attributes),
        }
    }
}

pub struct GivenCommand {
    state: CommandState<()>,
}

impl Command for GivenCommand {
    command_state!(());

    fn execute(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl FromAttributes for GivenCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new()
            .attribute_with_default("color", "red")
            .attribute("size")
            .attribute("note")
    }

    fn from_attributes(attributes: Attributes) -> Self {
        Self {
            state: CommandState::new(attributes),
        }
    }
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Behavior {
    Success,
    Failure,
    Raise,
}

pub struct TestCommand {
    state: CommandState<&'static str>,
    behavior: Behavior,
}

impl TestCommand {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            state: CommandState::default(),
            behavior,
        }
    }

    pub fn boxed(behavior: Behavior) -> Box<dyn Subcommand> {
        Box::new(Self::new(behavior))
    }
}

impl Command for TestCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        match self.behavior {
            Behavior::Success => Ok("child result"),
            Behavior::Failure => {
                self.state_mut().errors_mut().add(ErrorKey::Base, "failure");
                Ok("partial")
            }
            Behavior::Raise => Err(Boom.into()),
        }
    }
}

pub struct CompositeCommand {
    state: CommandState<&'static str>,
    pub children: Vec<Box<dyn Subcommand>>,
}

impl CompositeCommand {
    pub fn new(children: Vec<Box<dyn Subcommand>>) -> Self {
        Self {
            state: CommandState::default(),
            children,
        }
    }

    pub fn of(behaviors: &[Behavior]) -> Self {
        Self::new(behaviors.iter().copied().map(TestCommand::boxed).collect())
    }
}

impl Command for CompositeCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        call_subcommands(&mut self.children)?;
        Ok("composite result")
    }
}

/// Uses a typed child's result to build its own.
pub struct ChainingCommand {
    state: CommandState<String>,
    pub first: TestCommand,
    pub second: TestCommand,
}

impl ChainingCommand {
    pub fn new(first: Behavior, second: Behavior) -> Self {
        Self {
            state: CommandState::default(),
            first: TestCommand::new(first),
            second: TestCommand::new(second),
        }
    }
}

impl Command for ChainingCommand {
    command_state!(String);

    fn execute(&mut self) -> anyhow::Result<String> {
        let first = call_subcommand(&mut self.first)?.copied().unwrap_or_default();
        let second = call_subcommand(&mut self.second)?.copied().unwrap_or_default();
        Ok(format!("{first} + {second}"))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("storage unavailable")]
pub struct StorageUnavailable;

/// Records what a storage collaborator was asked to do.
#[derive(Debug, Default)]
pub struct RecordingTransaction {
    pub log: Vec<&'static str>,
}

impl Transaction for RecordingTransaction {
    type Error = StorageUnavailable;

    fn begin(&mut self) -> Result<(), StorageUnavailable> {
        self.log.push("begin");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageUnavailable> {
        self.log.push("commit");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StorageUnavailable> {
        self.log.push("rollback");
        Ok(())
    }
}

pub struct TransactionalCompositeCommand {
    state: CommandState<&'static str>,
    pub transaction: RecordingTransaction,
    pub children: Vec<Box<dyn Subcommand>>,
}

impl TransactionalCompositeCommand {
    pub fn of(behaviors: &[Behavior]) -> Self {
        Self {
            state: CommandState::default(),
            transaction: RecordingTransaction::default(),
            children: behaviors.iter().copied().map(TestCommand::boxed).collect(),
        }
    }
}

impl Command for TransactionalCompositeCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        let children = &mut self.children;
        with_transaction(&mut self.transaction, || call_subcommands(children))?;
        Ok("committed")
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

pub struct ChangedCommand {
    state: CommandState<()>,
}

impl Command for ChangedCommand {
    command_state!(());

    fn execute(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl Subject for ChangedCommand {
    const SUBJECT_NAME: Option<&'static str> = Some("user");
}

impl FromAttributes for ChangedCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new()
            .attribute("user")
            .attribute("name")
            .attribute("sorted_tags")
            .attribute("nickname")
    }

    fn from_attributes(attributes: Attributes) -> Self {
        Self {
            state: CommandState::new(attributes),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub name: String,
    pub sorted_tags: Vec<String>,
}

/// Compares against a typed record loaded outside the attribute bag.
pub struct RenameUserCommand {
    state: CommandState<()>,
    user: Option<User>,
    pub lookups: Cell<u32>,
}

impl RenameUserCommand {
    pub fn new(user: Option<User>, input: Value) -> Self {
        let attributes = Self::schema().build(input).expect("valid input");
        Self {
            state: CommandState::new(attributes),
            user,
            lookups: Cell::new(0),
        }
    }

    fn schema() -> AttributeSchema {
        AttributeSchema::new().attribute("name").attribute("sorted_tags")
    }
}

impl Command for RenameUserCommand {
    command_state!(());
}

impl Subject for RenameUserCommand {
    const SUBJECT_NAME: Option<&'static str> = Some("user");

    fn resolve_subject(&self, _name: &str) -> Option<Value> {
        self.lookups.set(self.lookups.get() + 1);
        self.user
            .as_ref()
            .map(|user| serde_json::to_value(user).expect("user serializes"))
    }
}

/// Opts into change detection without naming its subject.
pub struct UnconfiguredSubjectCommand {
    state: CommandState<()>,
}

impl Command for UnconfiguredSubjectCommand {
    command_state!(());
}

impl Subject for UnconfiguredSubjectCommand {}

impl FromAttributes for UnconfiguredSubjectCommand {
    fn schema() -> AttributeSchema {
        AttributeSchema::new().attribute("name")
    }

    fn from_attributes(attributes: Attributes) -> Self {
        Self {
            state: CommandState::new(attributes),
        }
    }
}

// ---------------------------------------------------------------------------
// Rescuable
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Raise {
    Timeout,
    WrappedTimeout,
    Boom,
    Misuse,
}

pub struct RescuableCommand {
    state: CommandState<&'static str>,
    raise: Raise,
}

impl RescuableCommand {
    pub fn new(raise: Raise) -> Self {
        Self {
            state: CommandState::default(),
            raise,
        }
    }
}

impl Command for RescuableCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        match self.raise {
            Raise::Timeout => Err(Timeout(500).into()),
            Raise::WrappedTimeout => Err(ChargeFailed {
                source: Timeout(250),
            }
            .into()),
            Raise::Boom => Err(Boom.into()),
            Raise::Misuse => Err(CommandError::undefined_subject("Nested").into()),
        }
    }

    fn rescuers(&self) -> Rescuers<Self> {
        Rescuers::new().rescue_from::<Timeout>(|command: &mut Self, err: &Timeout| {
            command
                .state_mut()
                .errors_mut()
                .add(ErrorKey::Base, err.to_string());
        })
    }
}

/// Rescues everything and records nothing.
#[derive(Default)]
pub struct SilentRescueCommand {
    state: CommandState<&'static str>,
}

impl Command for SilentRescueCommand {
    command_state!(&'static str);

    fn execute(&mut self) -> anyhow::Result<&'static str> {
        Err(Boom.into())
    }

    fn rescuers(&self) -> Rescuers<Self> {
        Rescuers::new().rescue_all(|_: &mut Self, _: &anyhow::Error| {})
    }
}
