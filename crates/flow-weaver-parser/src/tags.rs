//! Structured tag records (`spec.md §4.B`): one variant per tag in the
//! authoritative list, built by scanning each tag body's token stream.

use flow_weaver_ast::{CoercionKind, Endpoint, Placement};
use flow_weaver_macros::raw::{RawPathStep, RawPortRef};
use flow_weaver_source::{tokenize, Token};

use crate::error::{ParseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    NodeType,
    Workflow,
    Pattern,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortAttributes {
    pub scope: Option<String>,
    pub order: Option<i32>,
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortTag {
    pub name: String,
    pub default: Option<String>,
    pub attrs: PortAttributes,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTag {
    pub id: String,
    pub type_name: String,
    pub parent_scope: Option<String>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub minimized: bool,
    pub pull_execution: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectTag {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeTag {
    pub name: String,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionTag {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    FlowWeaver(BlockKind),
    Name(String),
    Label(String),
    Description(String),
    Color(String),
    Icon(String),
    TagLabel(String),
    ExecuteWhen(String),
    Scope(ScopeTag),
    Expression,
    PullExecution(String),
    Input(PortTag),
    Output(PortTag),
    Step(PortTag),
    StrictTypes,
    AutoConnect,
    Import { name: String, function_name: String, module: String },
    Node(NodeTag),
    Connect(ConnectTag),
    Map { instance_id: String, child_id: String, child_in: Option<String>, child_out: Option<String>, source: Endpoint },
    Path { steps: Vec<RawPathStep> },
    FanOut { source: RawPortRef, targets: Vec<RawPortRef> },
    FanIn { sources: Vec<RawPortRef>, target: RawPortRef },
    Coerce { id: String, source: RawPortRef, target: RawPortRef, kind: CoercionKind },
    Trigger { event: Option<String>, cron: Option<String> },
    CancelOn { event: Option<String>, match_expr: Option<String>, timeout: Option<String> },
    Retries(u32),
    Timeout(String),
    Throttle { limit: u32, period: Option<String> },
    Param(String),
    Returns(String),
    Position(PositionTag),
    Port { side: String, name: String },
}

fn ident_at(tokens: &[Token], i: usize) -> Option<String> {
    match tokens.get(i) {
        Some(Token::Ident(s)) => Some(s.clone()),
        _ => None,
    }
}

fn string_at(tokens: &[Token], i: usize) -> Option<String> {
    match tokens.get(i) {
        Some(Token::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Parses `a.port[:scope]` starting at `tokens[*i]`, advancing `i` past it.
fn parse_endpoint(tokens: &[Token], i: &mut usize) -> Result<Endpoint> {
    let node = ident_at(tokens, *i).ok_or(ParseError::MalformedTag("expected node name".into()))?;
    *i += 1;
    let mut port = String::new();
    if matches!(tokens.get(*i), Some(Token::Dot)) {
        *i += 1;
        port = ident_at(tokens, *i).ok_or(ParseError::MalformedTag("expected port name".into()))?;
        *i += 1;
    }
    let mut endpoint = Endpoint::new(node, port);
    if matches!(tokens.get(*i), Some(Token::Colon)) {
        *i += 1;
        let scope = ident_at(tokens, *i).ok_or(ParseError::MalformedTag("expected scope name".into()))?;
        *i += 1;
        endpoint = endpoint.with_scope(scope);
    }
    Ok(endpoint)
}

fn parse_port_ref(tokens: &[Token], i: &mut usize) -> Result<RawPortRef> {
    let node = ident_at(tokens, *i).ok_or(ParseError::MalformedTag("expected node name".into()))?;
    *i += 1;
    let mut port = None;
    if matches!(tokens.get(*i), Some(Token::Dot)) {
        *i += 1;
        port = ident_at(tokens, *i);
        *i += 1;
    }
    Ok(RawPortRef { node, port })
}

/// Parses a `@input|@output|@step` line body: `name[=default] [attrs] [-
/// description]` (`spec.md §4.B` port-line grammar).
fn parse_port_tag(body: &str) -> Result<PortTag> {
    let (head, description) = match body.split_once(" - ") {
        Some((h, d)) => (h.trim(), Some(d.trim().to_string())),
        None => (body.trim(), None),
    };
    let tokens = tokenize(head)?;
    let mut i = 0;
    let name = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("expected port name".into()))?;
    i += 1;
    let mut default = None;
    if matches!(tokens.get(i), Some(Token::Equals)) {
        i += 1;
        default = match tokens.get(i) {
            Some(Token::Ident(s)) => Some(s.clone()),
            Some(Token::String(s)) => Some(s.clone()),
            Some(Token::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        i += 1;
    }

    let mut attrs = PortAttributes::default();
    while i < tokens.len() {
        match &tokens[i] {
            Token::Ident(word) if word == "scope" => {
                i += 1;
                if matches!(tokens.get(i), Some(Token::Colon)) {
                    i += 1;
                }
                attrs.scope = ident_at(&tokens, i);
                i += 1;
            }
            Token::LBracket => {
                i += 1;
                if let Some(word) = ident_at(&tokens, i) {
                    i += 1;
                    if matches!(tokens.get(i), Some(Token::Colon)) {
                        i += 1;
                    }
                    match word.as_str() {
                        "order" => {
                            if let Some(Token::Number(n)) = tokens.get(i) {
                                attrs.order = Some(*n as i32);
                            }
                            i += 1;
                        }
                        "placement" => {
                            if let Some(p) = ident_at(&tokens, i) {
                                attrs.placement = match p.as_str() {
                                    "TOP" => Some(Placement::Top),
                                    "BOTTOM" => Some(Placement::Bottom),
                                    _ => None,
                                };
                            }
                            i += 1;
                        }
                        _ => {}
                    }
                }
                while !matches!(tokens.get(i), Some(Token::RBracket) | None) {
                    i += 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    Ok(PortTag { name, default, attrs, description })
}

/// Parses a single tag line of the form `@tagName <body>` into a `Tag`.
pub fn parse_tag_line(line: &str) -> Result<Option<Tag>> {
    let line = line.trim();
    if !line.starts_with('@') {
        return Ok(None);
    }
    let (name, rest) = match line[1..].split_once(char::is_whitespace) {
        Some((n, r)) => (n, r.trim()),
        None => (&line[1..], ""),
    };

    Ok(Some(match name {
        "flowWeaver" => Tag::FlowWeaver(match rest {
            "nodeType" | "node" => BlockKind::NodeType,
            "workflow" => BlockKind::Workflow,
            "pattern" => BlockKind::Pattern,
            other => return Err(ParseError::UnknownFlowWeaverKind(other.to_string())),
        }),
        "name" => Tag::Name(rest.to_string()),
        "label" => Tag::Label(rest.trim_matches('"').to_string()),
        "description" => Tag::Description(rest.to_string()),
        "color" => Tag::Color(rest.trim_matches('"').to_string()),
        "icon" => Tag::Icon(rest.trim_matches('"').to_string()),
        "tag" => Tag::TagLabel(rest.trim_matches('"').to_string()),
        "executeWhen" => Tag::ExecuteWhen(rest.to_string()),
        "expression" => Tag::Expression,
        "strictTypes" => Tag::StrictTypes,
        "autoConnect" => Tag::AutoConnect,
        "pullExecution" => Tag::PullExecution(rest.to_string()),
        "retries" => Tag::Retries(rest.parse().unwrap_or(0)),
        "timeout" => Tag::Timeout(rest.trim_matches('"').to_string()),
        "param" => Tag::Param(rest.to_string()),
        "returns" => Tag::Returns(rest.to_string()),
        "input" => Tag::Input(parse_port_tag(rest)?),
        "output" => Tag::Output(parse_port_tag(rest)?),
        "step" => Tag::Step(parse_port_tag(rest)?),
        "scope" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let sname = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@scope needs a name".into()))?;
            i += 1;
            let mut children = Vec::new();
            while i < tokens.len() {
                if let Token::Ident(c) = &tokens[i] {
                    children.push(c.clone());
                }
                i += 1;
            }
            Tag::Scope(ScopeTag { name: sname, children })
        }
        "fwImport" => {
            let tokens = tokenize(rest)?;
            let bind_name = ident_at(&tokens, 0).ok_or(ParseError::MalformedTag("@fwImport missing name".into()))?;
            let function_name = ident_at(&tokens, 1).ok_or(ParseError::MalformedTag("@fwImport missing functionName".into()))?;
            let module = tokens.iter().find_map(|t| if let Token::String(s) = t { Some(s.clone()) } else { None })
                .ok_or(ParseError::MalformedTag("@fwImport missing module".into()))?;
            Tag::Import { name: bind_name, function_name, module }
        }
        "node" => {
            let tokens = tokenize(rest)?;
            let id = ident_at(&tokens, 0).ok_or(ParseError::MalformedTag("@node missing id".into()))?;
            let type_name = ident_at(&tokens, 1).ok_or(ParseError::MalformedTag("@node missing type".into()))?;
            let mut i = 2;
            let parent_scope = if let Some(parent_id) = ident_at(&tokens, i) {
                if matches!(tokens.get(i + 1), Some(Token::Dot)) {
                    if let Some(scope_name) = ident_at(&tokens, i + 2) {
                        i += 3;
                        Some(format!("{parent_id}.{scope_name}"))
                    } else {
                        None
                    }
                } else {
                    None
                }
            } else {
                None
            };
            let mut label = None;
            let mut color = None;
            let mut icon = None;
            let mut minimized = false;
            let mut pull_execution = None;
            while i < tokens.len() {
                if let Token::Ident(word) = &tokens[i] {
                    match word.as_str() {
                        "label" if matches!(tokens.get(i + 1), Some(Token::Colon)) => {
                            label = string_at(&tokens, i + 2);
                        }
                        "color" if matches!(tokens.get(i + 1), Some(Token::Colon)) => {
                            color = string_at(&tokens, i + 2);
                        }
                        "icon" if matches!(tokens.get(i + 1), Some(Token::Colon)) => {
                            icon = string_at(&tokens, i + 2);
                        }
                        "minimized" => minimized = true,
                        "pullExecution" if matches!(tokens.get(i + 1), Some(Token::Colon)) => {
                            pull_execution = ident_at(&tokens, i + 2);
                        }
                        _ => {}
                    }
                }
                i += 1;
            }
            Tag::Node(NodeTag { id, type_name, parent_scope, label, color, icon, minimized, pull_execution })
        }
        "connect" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let from = parse_endpoint(&tokens, &mut i)?;
            if !matches!(tokens.get(i), Some(Token::Arrow)) {
                return Err(ParseError::MalformedTag("@connect missing ->".into()));
            }
            i += 1;
            let to = parse_endpoint(&tokens, &mut i)?;
            Tag::Connect(ConnectTag { from, to })
        }
        "map" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let instance_id = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@map missing instanceId".into()))?;
            i += 1;
            let child_id = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@map missing childId".into()))?;
            i += 1;
            let mut child_in = None;
            let mut child_out = None;
            if matches!(tokens.get(i), Some(Token::LParen)) {
                i += 1;
                child_in = ident_at(&tokens, i);
                i += 1;
                if matches!(tokens.get(i), Some(Token::Arrow)) {
                    i += 1;
                }
                child_out = ident_at(&tokens, i);
                i += 1;
                if matches!(tokens.get(i), Some(Token::RParen)) {
                    i += 1;
                }
            }
            // skip the `over` keyword
            if matches!(ident_at(&tokens, i).as_deref(), Some("over")) {
                i += 1;
            }
            let source = parse_endpoint(&tokens, &mut i)?;
            Tag::Map { instance_id, child_id, child_in, child_out, source }
        }
        "path" => {
            let tokens = tokenize(rest)?;
            let mut steps = Vec::new();
            let mut i = 0;
            while i < tokens.len() {
                let node = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@path expects node names".into()))?;
                i += 1;
                let mut route = None;
                if matches!(tokens.get(i), Some(Token::Colon)) {
                    i += 1;
                    route = ident_at(&tokens, i);
                    i += 1;
                }
                steps.push(RawPathStep { node, route });
                if matches!(tokens.get(i), Some(Token::Arrow)) {
                    i += 1;
                }
            }
            Tag::Path { steps }
        }
        "fanOut" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let source = parse_port_ref(&tokens, &mut i)?;
            if !matches!(tokens.get(i), Some(Token::Arrow)) {
                return Err(ParseError::MalformedTag("@fanOut missing ->".into()));
            }
            i += 1;
            let mut targets = Vec::new();
            loop {
                targets.push(parse_port_ref(&tokens, &mut i)?);
                if matches!(tokens.get(i), Some(Token::Comma)) {
                    i += 1;
                } else {
                    break;
                }
            }
            Tag::FanOut { source, targets }
        }
        "fanIn" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let mut sources = Vec::new();
            loop {
                sources.push(parse_port_ref(&tokens, &mut i)?);
                if matches!(tokens.get(i), Some(Token::Comma)) {
                    i += 1;
                } else {
                    break;
                }
            }
            if !matches!(tokens.get(i), Some(Token::Arrow)) {
                return Err(ParseError::MalformedTag("@fanIn missing ->".into()));
            }
            i += 1;
            let target = parse_port_ref(&tokens, &mut i)?;
            Tag::FanIn { sources, target }
        }
        "coerce" => {
            let tokens = tokenize(rest)?;
            let mut i = 0;
            let id = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@coerce missing id".into()))?;
            i += 1;
            let source = parse_port_ref(&tokens, &mut i)?;
            if !matches!(tokens.get(i), Some(Token::Arrow)) {
                return Err(ParseError::MalformedTag("@coerce missing ->".into()));
            }
            i += 1;
            let target = parse_port_ref(&tokens, &mut i)?;
            if !matches!(ident_at(&tokens, i).as_deref(), Some("as")) {
                return Err(ParseError::MalformedTag("@coerce missing 'as'".into()));
            }
            i += 1;
            let kind_name = ident_at(&tokens, i).ok_or(ParseError::MalformedTag("@coerce missing kind".into()))?;
            let kind = CoercionKind::from_name(&kind_name).ok_or(ParseError::MalformedTag(format!("unknown coercion kind '{kind_name}'")))?;
            Tag::Coerce { id, source, target, kind }
        }
        "trigger" => {
            let event = extract_attr(rest, "event");
            let cron = extract_attr(rest, "cron");
            Tag::Trigger { event, cron }
        }
        "cancelOn" => Tag::CancelOn {
            event: extract_attr(rest, "event"),
            match_expr: extract_attr(rest, "match"),
            timeout: extract_attr(rest, "timeout"),
        },
        "throttle" => {
            let limit = extract_attr(rest, "limit").and_then(|s| s.parse().ok()).unwrap_or(0);
            let period = extract_attr(rest, "period");
            Tag::Throttle { limit, period }
        }
        "position" => {
            let tokens = tokenize(rest)?;
            let id = ident_at(&tokens, 0).ok_or(ParseError::MalformedTag("@position missing id".into()))?;
            let x = match tokens.get(1) {
                Some(Token::Number(n)) => *n,
                _ => 0.0,
            };
            let y = match tokens.get(2) {
                Some(Token::Number(n)) => *n,
                _ => 0.0,
            };
            Tag::Position(PositionTag { id, x, y })
        }
        "port" => {
            let (side, port_name) = rest.split_once('.').ok_or(ParseError::MalformedTag("@port needs IN.name/OUT.name".into()))?;
            Tag::Port { side: side.to_string(), name: port_name.trim().to_string() }
        }
        other => return Err(ParseError::UnknownTag(other.to_string())),
    }))
}

/// Extracts `key="value"` from an attribute-style tag body without a full
/// tokenizer pass (used for the small `@trigger`/`@cancelOn`/`@throttle`
/// `key=value` grammars, which never nest brackets).
fn extract_attr(body: &str, key: &str) -> Option<String> {
    let needle = format!("{key}=");
    let start = body.find(&needle)? + needle.len();
    let rest = &body[start..];
    if let Some(stripped) = rest.strip_prefix('"') {
        let end = stripped.find('"')?;
        Some(stripped[..end].to_string())
    } else {
        Some(rest.split_whitespace().next()?.to_string())
    }
}
