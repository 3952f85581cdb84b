// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 定位表达式
//!
//! 支持两种写法：
//! - 路径表达式（XPath 子集）：`div/div/header/h2/a`、`div/div/div/p[2]/span/span[1]`、
//!   `//*[@id="events_list"]`。支持 `/` 子节点、`//` 后代、`*` 通配、`.` 自身、
//!   `[n]` 位置（从 1 开始）、`[@attr]` 和 `[@attr="v"]` 属性谓词；以 `/` 开头表示从文档根开始。
//! - CSS 选择器：以 `css:` 前缀书写，例如 `css:header h2 a`，由 scraper 解析。

use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

const CSS_PREFIX: &str = "css:";

/// 定位表达式编译错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// 空表达式
    #[error("Empty locator expression")]
    Empty,
    /// 路径语法错误
    #[error("Invalid path `{expr}`: {reason}")]
    Syntax { expr: String, reason: String },
    /// CSS 选择器语法错误
    #[error("Invalid CSS selector `{expr}`: {reason}")]
    Css { expr: String, reason: String },
}

/// 编译后的定位表达式
#[derive(Clone)]
pub struct Locator {
    source: String,
    kind: LocatorKind,
}

#[derive(Clone)]
enum LocatorKind {
    Path(PathExpr),
    Css(Selector),
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Locator").field(&self.source).finish()
    }
}

impl Locator {
    /// 编译定位表达式
    ///
    /// `css:` 前缀的表达式按 CSS 选择器解析，其余按路径表达式解析。
    pub fn parse(expr: &str) -> Result<Self, LocatorError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::Empty);
        }

        let kind = match trimmed.strip_prefix(CSS_PREFIX) {
            Some(css) => LocatorKind::Css(compile_css(css.trim())?),
            None => LocatorKind::Path(PathParser::new(trimmed).parse()?),
        };

        Ok(Self {
            source: trimmed.to_string(),
            kind,
        })
    }

    /// 直接从 CSS 选择器编译（无需前缀）
    pub fn css(selector: &str) -> Result<Self, LocatorError> {
        let selector = selector.trim();
        Ok(Self {
            source: format!("{}{}", CSS_PREFIX, selector),
            kind: LocatorKind::Css(compile_css(selector)?),
        })
    }

    /// 原始表达式
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 以 `node` 为上下文求值，按文档顺序返回所有匹配
    pub fn select<'a>(&self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match &self.kind {
            LocatorKind::Path(path) => path.evaluate(node),
            LocatorKind::Css(selector) => node.select(selector).collect(),
        }
    }

    /// 第一个匹配
    pub fn first<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match &self.kind {
            LocatorKind::Path(path) => path.evaluate(node).into_iter().next(),
            LocatorKind::Css(selector) => node.select(selector).next(),
        }
    }
}

impl std::str::FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn compile_css(selector: &str) -> Result<Selector, LocatorError> {
    if selector.is_empty() {
        return Err(LocatorError::Empty);
    }
    Selector::parse(selector).map_err(|e| LocatorError::Css {
        expr: selector.to_string(),
        reason: e.to_string(),
    })
}

/// 元素的可见文本：所有后代文本节点拼接后去掉首尾空白
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Any,
    Context,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttr(String),
    AttrEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathExpr {
    absolute: bool,
    steps: Vec<Step>,
}

/// 求值上下文：文档根或某个元素
#[derive(Clone, Copy)]
enum Scope<'a> {
    Document(ElementRef<'a>),
    Element(ElementRef<'a>),
}

impl<'a> Scope<'a> {
    fn children(self) -> Vec<ElementRef<'a>> {
        match self {
            Scope::Document(root) => vec![root],
            Scope::Element(el) => el.children().filter_map(ElementRef::wrap).collect(),
        }
    }

    fn descendants_or_self(self) -> Vec<Scope<'a>> {
        match self {
            Scope::Document(root) => std::iter::once(self)
                .chain(
                    root.descendants()
                        .filter_map(ElementRef::wrap)
                        .map(Scope::Element),
                )
                .collect(),
            Scope::Element(el) => el
                .descendants()
                .filter_map(ElementRef::wrap)
                .map(Scope::Element)
                .collect(),
        }
    }
}

fn document_element(node: ElementRef<'_>) -> ElementRef<'_> {
    node.ancestors()
        .filter_map(ElementRef::wrap)
        .last()
        .unwrap_or(node)
}

impl Step {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        match &self.test {
            NodeTest::Any => true,
            NodeTest::Named(name) => el.value().name().eq_ignore_ascii_case(name),
            NodeTest::Context => false,
        }
    }

    fn apply<'a>(&self, base: Scope<'a>, out: &mut Vec<Scope<'a>>) {
        if self.test == NodeTest::Context {
            out.push(base);
            return;
        }

        let mut candidates: Vec<ElementRef<'a>> = base
            .children()
            .into_iter()
            .filter(|el| self.matches(el))
            .collect();

        for predicate in &self.predicates {
            candidates = match predicate {
                Predicate::Position(n) => candidates.get(n - 1).copied().into_iter().collect(),
                Predicate::HasAttr(name) => candidates
                    .into_iter()
                    .filter(|el| el.value().attr(name).is_some())
                    .collect(),
                Predicate::AttrEquals(name, value) => candidates
                    .into_iter()
                    .filter(|el| el.value().attr(name) == Some(value.as_str()))
                    .collect(),
            };
        }

        out.extend(candidates.into_iter().map(Scope::Element));
    }
}

impl PathExpr {
    fn evaluate<'a>(&self, node: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let root = document_element(node);
        let mut scopes = if self.absolute {
            vec![Scope::Document(root)]
        } else {
            vec![Scope::Element(node)]
        };

        for step in &self.steps {
            let mut next = Vec::new();
            for scope in scopes {
                match step.axis {
                    Axis::Child => step.apply(scope, &mut next),
                    Axis::Descendant => {
                        for base in scope.descendants_or_self() {
                            step.apply(base, &mut next);
                        }
                    }
                }
            }
            let mut seen = HashSet::new();
            next.retain(|scope| match scope {
                Scope::Element(el) => seen.insert((**el).id()),
                Scope::Document(_) => true,
            });
            scopes = next;
            if scopes.is_empty() {
                return Vec::new();
            }
        }

        let matched: HashSet<_> = scopes
            .into_iter()
            .filter_map(|scope| match scope {
                Scope::Element(el) => Some((*el).id()),
                Scope::Document(_) => None,
            })
            .collect();

        // Document order, each node once
        root.descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| matched.contains(&(**el).id()))
            .collect()
    }
}

struct PathParser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> PathParser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> LocatorError {
        LocatorError::Syntax {
            expr: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse(mut self) -> Result<PathExpr, LocatorError> {
        let absolute = self.peek() == Some('/');
        let mut steps = Vec::new();

        loop {
            let axis = if self.eat('/') {
                if self.eat('/') {
                    Axis::Descendant
                } else {
                    Axis::Child
                }
            } else if steps.is_empty() {
                Axis::Child
            } else {
                let found = self.peek().unwrap_or_default();
                return Err(self.error(format!(
                    "unexpected `{}` at position {}",
                    found, self.pos
                )));
            };

            if self.at_end() {
                return Err(self.error("path ends with `/`"));
            }
            steps.push(self.step(axis)?);

            if self.at_end() {
                break;
            }
        }

        Ok(PathExpr { absolute, steps })
    }

    fn name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':'))
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn step(&mut self, axis: Axis) -> Result<Step, LocatorError> {
        let test = if self.eat('*') {
            NodeTest::Any
        } else if self.eat('.') {
            if self.eat('.') {
                return Err(self.error("parent steps (`..`) are not supported"));
            }
            NodeTest::Context
        } else {
            let name = self.name();
            if name.is_empty() {
                let found = self.peek().unwrap_or_default();
                return Err(self.error(format!(
                    "expected element name at position {}, found `{}`",
                    self.pos, found
                )));
            }
            NodeTest::Named(name.to_ascii_lowercase())
        };

        let mut predicates = Vec::new();
        while self.peek() == Some('[') {
            if test == NodeTest::Context {
                return Err(self.error("predicates on `.` are not supported"));
            }
            predicates.push(self.predicate()?);
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn predicate(&mut self) -> Result<Predicate, LocatorError> {
        self.eat('[');
        self.skip_ws();

        let predicate = if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            let n: usize = digits
                .parse()
                .map_err(|_| self.error(format!("position `{}` is out of range", digits)))?;
            if n == 0 {
                return Err(self.error("positions start at 1"));
            }
            Predicate::Position(n)
        } else if self.eat('@') {
            let attr = self.name();
            if attr.is_empty() {
                return Err(self.error(format!("expected attribute name at position {}", self.pos)));
            }
            self.skip_ws();
            if self.eat('=') {
                self.skip_ws();
                Predicate::AttrEquals(attr, self.quoted()?)
            } else {
                Predicate::HasAttr(attr)
            }
        } else {
            return Err(self.error(format!(
                "unsupported predicate at position {}",
                self.pos
            )));
        };

        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error(format!("expected `]` at position {}", self.pos)));
        }
        Ok(predicate)
    }

    fn quoted(&mut self) -> Result<String, LocatorError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error(format!("expected quoted value at position {}", self.pos))),
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }
}
