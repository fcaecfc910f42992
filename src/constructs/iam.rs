// Copyright (c) 2025 - Cowboy AI, Inc.
//! IAM policy documents, roles and inline policies

use serde_json::{json, Map, Value};

use crate::domain::{AccountId, ResourceType};
use crate::errors::SynthResult;
use crate::stack::Stack;
use crate::template::intrinsic;

/// Policy document language version
pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Who a statement applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// The root of another AWS account
    Account(AccountId),
    /// An AWS service, e.g. `lambda.amazonaws.com`
    Service(String),
    /// Anyone
    Any,
}

impl Principal {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Account(account) => json!({
                "AWS": intrinsic::partition_arn("iam", "", account.as_str(), "root")
            }),
            Self::Service(service) => json!({ "Service": service }),
            Self::Any => json!({ "AWS": "*" }),
        }
    }
}

/// One statement of a policy document
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub principal: Option<Principal>,
    pub resources: Vec<Value>,
    pub condition: Option<Value>,
}

impl PolicyStatement {
    pub fn allow() -> Self {
        Self::with_effect(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::with_effect(Effect::Deny)
    }

    fn with_effect(effect: Effect) -> Self {
        Self {
            effect,
            actions: Vec::new(),
            principal: None,
            resources: Vec::new(),
            condition: None,
        }
    }

    pub fn actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Value>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Render the statement; single actions and resources collapse to scalars
    pub fn to_json(&self) -> Value {
        let mut statement = Map::new();
        statement.insert("Action".to_string(), collapse(self.actions.iter().map(|a| json!(a)).collect()));
        if let Some(condition) = &self.condition {
            statement.insert("Condition".to_string(), condition.clone());
        }
        statement.insert("Effect".to_string(), json!(self.effect.as_str()));
        if let Some(principal) = &self.principal {
            statement.insert("Principal".to_string(), principal.to_json());
        }
        if !self.resources.is_empty() {
            statement.insert("Resource".to_string(), collapse(self.resources.clone()));
        }
        Value::Object(statement)
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// An ordered list of statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Statement": self.statements.iter().map(PolicyStatement::to_json).collect::<Vec<_>>(),
            "Version": POLICY_VERSION,
        })
    }
}

/// Append a rendered statement to the `PolicyDocument` property of a resource
pub(crate) fn append_statement(
    stack: &mut Stack,
    logical_id: &str,
    statement: &PolicyStatement,
) -> SynthResult<()> {
    let resource = stack.resource_mut(logical_id)?;
    let document = resource
        .properties
        .entry("PolicyDocument")
        .or_insert_with(|| PolicyDocument::default().to_json());

    if let Some(Value::Array(statements)) = document.get_mut("Statement") {
        statements.push(statement.to_json());
    }
    Ok(())
}

/// An IAM role
#[derive(Debug, Clone)]
pub struct Role {
    logical_id: String,
}

impl Role {
    /// Create a role assumable by `assumed_by` with AWS managed policies attached
    pub fn new(
        stack: &mut Stack,
        path: &[&str],
        assumed_by: Principal,
        managed_policies: &[&str],
    ) -> SynthResult<Self> {
        let assume = PolicyStatement::allow()
            .actions(["sts:AssumeRole"])
            .principal(assumed_by);

        let managed: Vec<Value> = managed_policies
            .iter()
            .map(|name| {
                intrinsic::join(
                    "",
                    vec![
                        json!("arn:"),
                        intrinsic::pseudo(intrinsic::Pseudo::Partition),
                        json!(format!(":iam::aws:policy/{}", name)),
                    ],
                )
            })
            .collect();

        let logical_id = stack.add_resource(
            path,
            ResourceType::Role,
            json!({
                "AssumeRolePolicyDocument": PolicyDocument::new(vec![assume]).to_json(),
                "ManagedPolicyArns": managed,
            }),
        )?;

        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn role_arn(&self) -> Value {
        intrinsic::get_att(&self.logical_id, "Arn")
    }
}

/// An inline policy attached to one role
#[derive(Debug, Clone)]
pub struct Policy {
    logical_id: String,
}

impl Policy {
    pub fn attach(stack: &mut Stack, path: &[&str], role: &Role) -> SynthResult<Self> {
        let policy_name = Stack::logical_id(path);
        let logical_id = stack.add_resource(
            path,
            ResourceType::Policy,
            json!({
                "PolicyDocument": PolicyDocument::default().to_json(),
                "PolicyName": policy_name,
                "Roles": [intrinsic::reference(role.logical_id())],
            }),
        )?;

        Ok(Self { logical_id })
    }

    /// Handle to a policy already in the stack
    pub(crate) fn existing(logical_id: String) -> Self {
        Self { logical_id }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn add_statement(&self, stack: &mut Stack, statement: &PolicyStatement) -> SynthResult<()> {
        append_statement(stack, &self.logical_id, statement)
    }
}
