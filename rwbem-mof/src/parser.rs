//! Recursive-descent MOF parser (DSP0004 §A)
//!
//! Builds a [`CompilationUnit`] from tokens. On a syntax error the
//! parser reports (file, line, column, nearby token) and synchronizes at
//! the next statement boundary (`;` at brace depth zero) to look for
//! further errors; the first error is returned, later ones are logged.

use crate::ast::{
    ClassDecl, CompilationUnit, DataType, Feature, Initializer, InstanceDecl, Literal, MethodDecl,
    ParameterDecl, Pragma, Production, PropertyDecl, PropertyInit, QualifierApplication,
    QualifierTypeDecl,
};
use crate::error::{MofError, MofResult, SourceLocation};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use tracing::warn;

/// Parse one MOF source text
pub fn parse(source: &str, file: &str) -> MofResult<CompilationUnit> {
    let tokens = Lexer::new(source, file).tokenize()?;
    Parser {
        tokens,
        pos: 0,
        file: file.to_string(),
    }
    .unit()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: String,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize always terminates the stream with Eof
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream always holds at least Eof")
        })
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn location_of(&self, span: Span) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: span.line,
            column: span.column,
        }
    }

    fn err_here(&self, message: impl Into<String>) -> MofError {
        let token = self.peek();
        MofError::parse(
            self.location_of(token.span),
            format!("{} (near {})", message.into(), token.kind),
        )
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> MofResult<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.err_here(format!("expected {what}")))
        }
    }

    fn ident(&mut self, what: &str) -> MofResult<(String, Span)> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.peek().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.err_here(format!("expected {what}"))),
        }
    }

    /// Skip to the next `;` at brace depth zero (or EOF)
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                TokenKind::Semicolon => {
                    self.advance();
                    if depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn unit(mut self) -> MofResult<CompilationUnit> {
        let mut productions = Vec::new();
        let mut errors: Vec<MofError> = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::Eof) {
            match self.production() {
                Ok(production) => productions.push(production),
                Err(error) => {
                    errors.push(error);
                    self.synchronize();
                }
            }
        }
        let mut errors = errors.into_iter();
        match errors.next() {
            None => Ok(CompilationUnit { productions }),
            Some(first) => {
                for later in errors {
                    warn!(error = %later, "additional MOF parse error");
                }
                Err(first)
            }
        }
    }

    fn production(&mut self) -> MofResult<Production> {
        match self.peek_kind() {
            TokenKind::KwPragma => self.pragma().map(Production::Pragma),
            TokenKind::KwQualifier => self.qualifier_type().map(Production::QualifierType),
            TokenKind::LBracket | TokenKind::KwClass | TokenKind::KwInstance => {
                let qualifiers = if matches!(self.peek_kind(), TokenKind::LBracket) {
                    self.qualifier_list()?
                } else {
                    Vec::new()
                };
                match self.peek_kind() {
                    TokenKind::KwClass => self.class_decl(qualifiers).map(Production::Class),
                    TokenKind::KwInstance => {
                        self.instance_decl(qualifiers).map(Production::Instance)
                    }
                    _ => Err(self.err_here("expected 'class' or 'instance'")),
                }
            }
            _ => Err(self.err_here("expected a declaration")),
        }
    }

    fn pragma(&mut self) -> MofResult<Pragma> {
        let span = self.peek().span;
        self.advance(); // #pragma
        let (name, _) = self.ident("a pragma name")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let argument = match self.peek_kind().clone() {
            TokenKind::StringLit(s) => {
                self.advance();
                s
            }
            _ => return Err(self.err_here("expected a string argument")),
        };
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(Pragma {
            name,
            argument,
            span,
        })
    }

    // ---- qualifiers -----------------------------------------------------

    fn qualifier_list(&mut self) -> MofResult<Vec<QualifierApplication>> {
        self.expect(&TokenKind::LBracket, "'['")?;
        let mut qualifiers = vec![self.qualifier_application()?];
        while self.eat(&TokenKind::Comma) {
            qualifiers.push(self.qualifier_application()?);
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(qualifiers)
    }

    fn qualifier_application(&mut self) -> MofResult<QualifierApplication> {
        let (name, span) = self.ident("a qualifier name")?;
        let value = match self.peek_kind() {
            TokenKind::LParen => {
                self.advance();
                let literal = self.literal()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Some(Initializer::Scalar(literal))
            }
            TokenKind::LBrace => Some(self.array_initializer()?),
            _ => None,
        };
        let mut flavors = Vec::new();
        if self.eat(&TokenKind::Colon) {
            while let TokenKind::Ident(flavor) = self.peek_kind().clone() {
                flavors.push(flavor);
                self.advance();
            }
            if flavors.is_empty() {
                return Err(self.err_here("expected a flavor name"));
            }
        }
        Ok(QualifierApplication {
            name,
            value,
            flavors,
            span,
        })
    }

    fn qualifier_type(&mut self) -> MofResult<QualifierTypeDecl> {
        let span = self.peek().span;
        self.advance(); // qualifier
        let (name, _) = self.ident("a qualifier name")?;
        self.expect(&TokenKind::Colon, "':'")?;
        let (type_name, type_span) = self.ident("a data type")?;
        let data_type: rwbem_types::CimType = type_name
            .parse()
            .map_err(|_| {
                MofError::parse(
                    self.location_of(type_span),
                    format!("unknown data type {type_name:?}"),
                )
            })?;
        let (is_array, array_size) = self.array_suffix()?;
        let default = if self.eat(&TokenKind::Equals) {
            Some(self.initializer()?)
        } else {
            None
        };

        self.expect(&TokenKind::Comma, "','")?;
        if !matches!(self.peek_kind(), TokenKind::KwScope) {
            return Err(self.err_here("expected 'Scope'"));
        }
        self.advance();
        self.expect(&TokenKind::LParen, "'('")?;
        let mut scopes = vec![self.scope_element()?];
        while self.eat(&TokenKind::Comma) {
            scopes.push(self.scope_element()?);
        }
        self.expect(&TokenKind::RParen, "')'")?;

        let mut flavors = Vec::new();
        if self.eat(&TokenKind::Comma) {
            if !matches!(self.peek_kind(), TokenKind::KwFlavor) {
                return Err(self.err_here("expected 'Flavor'"));
            }
            self.advance();
            self.expect(&TokenKind::LParen, "'('")?;
            flavors.push(self.ident("a flavor name")?.0);
            while self.eat(&TokenKind::Comma) {
                flavors.push(self.ident("a flavor name")?.0);
            }
            self.expect(&TokenKind::RParen, "')'")?;
        }
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(QualifierTypeDecl {
            name,
            data_type,
            is_array,
            array_size,
            default,
            scopes,
            flavors,
            span,
        })
    }

    fn scope_element(&mut self) -> MofResult<String> {
        match self.peek_kind().clone() {
            // `class` and `reference` are reserved words elsewhere
            TokenKind::KwClass => {
                self.advance();
                Ok("class".to_string())
            }
            TokenKind::KwRef => {
                self.advance();
                Ok("reference".to_string())
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.err_here("expected a scope element")),
        }
    }

    // ---- classes --------------------------------------------------------

    fn class_decl(&mut self, qualifiers: Vec<QualifierApplication>) -> MofResult<ClassDecl> {
        let span = self.peek().span;
        self.advance(); // class
        let (name, _) = self.ident("a class name")?;
        let superclass = if self.eat(&TokenKind::Colon) {
            Some(self.ident("a superclass name")?.0)
        } else {
            None
        };
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut features = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            features.push(self.feature()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(ClassDecl {
            qualifiers,
            name,
            superclass,
            features,
            span,
        })
    }

    fn data_type(&mut self) -> MofResult<(DataType, Span)> {
        let (type_name, span) = self.ident("a data type or class name")?;
        if matches!(self.peek_kind(), TokenKind::KwRef) {
            self.advance();
            return Ok((DataType::Reference(type_name), span));
        }
        let cim_type: rwbem_types::CimType = type_name.parse().map_err(|_| {
            MofError::parse(
                self.location_of(span),
                format!("unknown data type {type_name:?}"),
            )
        })?;
        Ok((DataType::Cim(cim_type), span))
    }

    fn feature(&mut self) -> MofResult<Feature> {
        let qualifiers = if matches!(self.peek_kind(), TokenKind::LBracket) {
            self.qualifier_list()?
        } else {
            Vec::new()
        };
        let (data_type, span) = self.data_type()?;
        let (name, _) = self.ident("a member name")?;
        if matches!(self.peek_kind(), TokenKind::LParen) {
            let parameters = self.parameter_list()?;
            self.expect(&TokenKind::Semicolon, "';'")?;
            return Ok(Feature::Method(MethodDecl {
                qualifiers,
                return_type: data_type,
                name,
                parameters,
                span,
            }));
        }
        let (is_array, array_size) = self.array_suffix()?;
        let default = if self.eat(&TokenKind::Equals) {
            Some(self.initializer()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(Feature::Property(PropertyDecl {
            qualifiers,
            data_type,
            name,
            is_array,
            array_size,
            default,
            span,
        }))
    }

    fn parameter_list(&mut self) -> MofResult<Vec<ParameterDecl>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut parameters = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            parameters.push(self.parameter()?);
            while self.eat(&TokenKind::Comma) {
                parameters.push(self.parameter()?);
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(parameters)
    }

    fn parameter(&mut self) -> MofResult<ParameterDecl> {
        let qualifiers = if matches!(self.peek_kind(), TokenKind::LBracket) {
            self.qualifier_list()?
        } else {
            Vec::new()
        };
        let (data_type, span) = self.data_type()?;
        let (name, _) = self.ident("a parameter name")?;
        let (is_array, array_size) = self.array_suffix()?;
        Ok(ParameterDecl {
            qualifiers,
            data_type,
            name,
            is_array,
            array_size,
            span,
        })
    }

    fn array_suffix(&mut self) -> MofResult<(bool, Option<u32>)> {
        if !self.eat(&TokenKind::LBracket) {
            return Ok((false, None));
        }
        let size = match self.peek_kind().clone() {
            TokenKind::IntLit(n) => {
                self.advance();
                let size = u32::try_from(n)
                    .map_err(|_| self.err_here("array size out of range"))?;
                Some(size)
            }
            _ => None,
        };
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok((true, size))
    }

    // ---- instances ------------------------------------------------------

    fn instance_decl(
        &mut self,
        qualifiers: Vec<QualifierApplication>,
    ) -> MofResult<InstanceDecl> {
        let span = self.peek().span;
        self.advance(); // instance
        if !self.eat(&TokenKind::KwOf) {
            return Err(self.err_here("expected 'of'"));
        }
        let (class_name, _) = self.ident("a class name")?;
        let alias = match self.peek_kind().clone() {
            TokenKind::KwAs => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::AliasIdent(alias) => {
                        self.advance();
                        Some(alias)
                    }
                    _ => return Err(self.err_here("expected an alias ($name)")),
                }
            }
            _ => None,
        };
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut properties = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            properties.push(self.property_init()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(InstanceDecl {
            qualifiers,
            class_name,
            alias,
            properties,
            span,
        })
    }

    fn property_init(&mut self) -> MofResult<PropertyInit> {
        let qualifiers = if matches!(self.peek_kind(), TokenKind::LBracket) {
            self.qualifier_list()?
        } else {
            Vec::new()
        };
        let (name, span) = self.ident("a property name")?;
        self.expect(&TokenKind::Equals, "'='")?;
        let value = self.initializer()?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        Ok(PropertyInit {
            qualifiers,
            name,
            value,
            span,
        })
    }

    // ---- initializers ---------------------------------------------------

    fn initializer(&mut self) -> MofResult<Initializer> {
        if matches!(self.peek_kind(), TokenKind::LBrace) {
            self.array_initializer()
        } else {
            Ok(Initializer::Scalar(self.literal()?))
        }
    }

    fn array_initializer(&mut self) -> MofResult<Initializer> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut elements = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RBrace) {
            elements.push(self.literal()?);
            while self.eat(&TokenKind::Comma) {
                elements.push(self.literal()?);
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Initializer::Array(elements))
    }

    fn literal(&mut self) -> MofResult<Literal> {
        match self.peek_kind().clone() {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Literal::Int(n))
            }
            TokenKind::RealLit(r) => {
                self.advance();
                Ok(Literal::Real(r))
            }
            TokenKind::StringLit(first) => {
                self.advance();
                // adjacent string literals concatenate
                let mut out = first;
                while let TokenKind::StringLit(next) = self.peek_kind().clone() {
                    out.push_str(&next);
                    self.advance();
                }
                Ok(Literal::String(out))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Literal::Char(c))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok(Literal::Boolean(true))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok(Literal::Boolean(false))
            }
            TokenKind::KwNull => {
                self.advance();
                Ok(Literal::Null)
            }
            TokenKind::AliasIdent(alias) => {
                self.advance();
                Ok(Literal::Alias(alias))
            }
            _ => Err(self.err_here("expected a literal value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwbem_types::CimType;

    #[test]
    fn parses_class_with_members() {
        let unit = parse(
            "class ACME_Fan : CIM_Fan {\n\
             \x20  [Key] string DeviceID;\n\
             \x20  uint8 Level = 3;\n\
             \x20  uint16 Codes[] = { 1, 2 };\n\
             \x20  CIM_System REF System;\n\
             \x20  uint32 SetSpeed([IN] uint64 Speed);\n\
             };",
            "fan.mof",
        )
        .unwrap();
        assert_eq!(unit.productions.len(), 1);
        let Production::Class(class) = &unit.productions[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name, "ACME_Fan");
        assert_eq!(class.superclass.as_deref(), Some("CIM_Fan"));
        assert_eq!(class.features.len(), 5);
        let Feature::Property(key) = &class.features[0] else {
            panic!("expected property");
        };
        assert_eq!(key.qualifiers[0].name, "Key");
        assert!(key.qualifiers[0].value.is_none());
        let Feature::Property(array) = &class.features[2] else {
            panic!("expected property");
        };
        assert!(array.is_array);
        assert_eq!(
            array.default,
            Some(Initializer::Array(vec![Literal::Int(1), Literal::Int(2)]))
        );
        let Feature::Property(reference) = &class.features[3] else {
            panic!("expected property");
        };
        assert_eq!(reference.data_type, DataType::Reference("CIM_System".into()));
        let Feature::Method(method) = &class.features[4] else {
            panic!("expected method");
        };
        assert_eq!(method.parameters.len(), 1);
        assert_eq!(method.parameters[0].qualifiers[0].name, "IN");
    }

    #[test]
    fn parses_qualifier_declaration() {
        let unit = parse(
            "Qualifier Description : string = \"\",\n\
             \x20   Scope(class, property, method),\n\
             \x20   Flavor(EnableOverride, Translatable);",
            "quals.mof",
        )
        .unwrap();
        let Production::QualifierType(decl) = &unit.productions[0] else {
            panic!("expected qualifier type");
        };
        assert_eq!(decl.name, "Description");
        assert_eq!(decl.data_type, CimType::String);
        assert_eq!(decl.scopes, ["class", "property", "method"]);
        assert_eq!(decl.flavors, ["EnableOverride", "Translatable"]);
    }

    #[test]
    fn parses_instance_with_alias() {
        let unit = parse(
            "instance of ACME_Fan as $fan1 {\n\
             \x20  DeviceID = \"fan\" \"01\";\n\
             \x20  Level = 0x0A;\n\
             };",
            "inst.mof",
        )
        .unwrap();
        let Production::Instance(instance) = &unit.productions[0] else {
            panic!("expected instance");
        };
        assert_eq!(instance.class_name, "ACME_Fan");
        assert_eq!(instance.alias.as_deref(), Some("fan1"));
        assert_eq!(
            instance.properties[0].value,
            Initializer::Scalar(Literal::String("fan01".into()))
        );
        assert_eq!(
            instance.properties[1].value,
            Initializer::Scalar(Literal::Int(10))
        );
    }

    #[test]
    fn parses_pragmas() {
        let unit = parse(
            "#pragma namespace(\"root/cimv2\")\n#pragma include(\"other.mof\")",
            "main.mof",
        )
        .unwrap();
        assert_eq!(unit.productions.len(), 2);
        let Production::Pragma(ns) = &unit.productions[0] else {
            panic!("expected pragma");
        };
        assert_eq!(ns.name, "namespace");
        assert_eq!(ns.argument, "root/cimv2");
    }

    #[test]
    fn syntax_errors_name_file_line_and_token() {
        let err = parse("class Foo {\n  uint8 = 5;\n};", "bad.mof").unwrap_err();
        let MofError::Parse { location, message } = err else {
            panic!("expected parse error");
        };
        assert_eq!(location.file, "bad.mof");
        assert_eq!(location.line, 2);
        assert!(message.contains("near"), "message was {message:?}");
    }

    #[test]
    fn recovery_reports_the_first_error() {
        // two bad productions; the first is reported
        let err = parse("class {};\nclass Also {};bogus", "r.mof").unwrap_err();
        let MofError::Parse { location, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(location.line, 1);
    }
}
