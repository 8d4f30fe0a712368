//! Source-driven parameter introspection.
//!
//! [`FunctionAnalyser`] locates the function or class declaration in a
//! [`SyntaxTree`] and records its parameters; [`ParameterAnalyser`] walks them
//! in declaration order. The container maps each parameter to an identifier
//! through, in order of priority, an `#[inject(..)]` hint and the parameter's
//! type.
//!
//! Recognised declarations:
//!
//! | source                                   | parameters        | body |
//! |------------------------------------------|-------------------|------|
//! | `impl T { fn new(a: A) -> Self { .. } }` | constructor args  | yes  |
//! | `fn build(a: A) -> T { .. }`             | fn args           | yes  |
//! | `struct T { a: A }`                      | fields            | yes  |
//! | `\|a: A\| T::new(a)`                     | closure inputs    | yes  |
//! | `fn new(a: A) -> Self;`                  | fn args           | no   |
//! | `trait T { .. }`                         | constructor args  | no   |
//!
//! Parameter attributes: `#[inject("name")]` or `#[inject(Marker)]` name the
//! dependency, `#[default]` marks a parameter the constructor can default,
//! `#[rest]` marks the variadic tail. An `Option<..>` type also counts as
//! defaulted.
//!
//! This is a heuristic over source text: renamed or reshaped declarations
//! defeat it, and explicit bindings remain the reliable path.

use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprClosure, ExprLit, Fields, FnArg, ForeignItemFn, GenericArgument,
    ImplItem, Item, Lit, Pat, PathArguments, PathSegment, Signature, Token, TraitItem, Type,
    TypeParamBound,
};

use crate::error::{Error, Result};
use crate::syntax::{self, SyntaxTree};

/// Smart pointers looked through when reading a parameter's type.
const WRAPPERS: &[&str] = &["Rc", "Arc", "Box", "Shared"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    Constructor,
    Struct,
    /// Inherent `impl` block without a constructor.
    Impl,
    Trait,
    Signature,
    Closure,
}

/// How a parameter names its dependency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// A binding name, from `#[inject("name")]`.
    Name(String),
    /// A type or interface marker, resolved through the container's declarations.
    Type(String),
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    type_reference: Option<String>,
    contextual: Option<Reference>,
    has_default: bool,
    is_rest: bool,
}

impl ParameterDescriptor {
    fn build(name: String, attrs: &[Attribute], ty: Option<&Type>) -> Result<Self> {
        let (type_reference, optional) = match ty.and_then(inspect_type) {
            Some((name, optional)) => (Some(name), optional),
            None => (None, false),
        };

        let mut descriptor = Self {
            name,
            type_reference,
            contextual: None,
            has_default: optional,
            is_rest: false,
        };

        for attr in attrs {
            let path = attr.path();
            if path.is_ident("inject") {
                descriptor.contextual = Some(parse_hint(attr)?);
            } else if path.is_ident("default") {
                descriptor.has_default = true;
            } else if path.is_ident("rest") {
                descriptor.is_rest = true;
            }
        }

        Ok(descriptor)
    }

    /// Binding name of the parameter, or `argN` / the field index when it has none.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last path segment of the parameter type, with pointers and `Option` stripped.
    pub fn type_reference(&self) -> Option<&str> {
        self.type_reference.as_deref()
    }

    /// Explicit `#[inject(..)]` hint.
    pub fn contextual(&self) -> Option<&Reference> {
        self.contextual.as_ref()
    }

    /// `#[default]` or an `Option<..>` type: the constructor can fill the slot itself.
    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// `#[rest]` or a variadic tail. Never injected.
    pub fn is_rest(&self) -> bool {
        self.is_rest
    }
}

/// Structural facts about one function or class declaration.
#[derive(Clone, Debug)]
pub struct FunctionAnalyser {
    kind: DeclarationKind,
    has_body: bool,
    parameters: Vec<ParameterDescriptor>,
}

impl FunctionAnalyser {
    /// Parses `source` and analyses the declaration it holds.
    ///
    /// `constructor` is the associated function looked up in `impl` blocks.
    pub fn analyse(source: &str, constructor: &str) -> Result<Self> {
        let tree = syntax::parse(source)?;
        Self::from_tree(&tree, constructor)
    }

    /// Analyses an already parsed tree.
    pub fn from_tree(tree: &SyntaxTree, constructor: &str) -> Result<Self> {
        match tree {
            SyntaxTree::Items(file) => Self::from_items(&file.items, constructor),
            SyntaxTree::Signature(item) => {
                Self::from_signature(DeclarationKind::Signature, &item.sig, false)
            }
            SyntaxTree::Closure(closure) => Self::from_closure(closure),
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Whether the declaration lists any parameter.
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Whether the declaration has an executable body. Traits and bare
    /// signatures do not and are never instantiated.
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    /// Ordered view over the parameters; `None` when there are none.
    pub fn parameter_analyser(&self) -> Option<ParameterAnalyser<'_>> {
        self.has_parameters().then(|| ParameterAnalyser {
            parameters: &self.parameters,
        })
    }

    fn from_items(items: &[Item], constructor: &str) -> Result<Self> {
        let mut constructors = Vec::new();
        let mut declarations = Vec::new();
        let mut bare_impl = false;

        for item in items {
            match item {
                Item::Impl(block) if block.trait_.is_none() => {
                    let found = block.items.iter().find_map(|item| match item {
                        ImplItem::Fn(function) if function.sig.ident == constructor => Some(function),
                        _ => None,
                    });
                    match found {
                        Some(function) => constructors.push(Self::from_signature(
                            DeclarationKind::Constructor,
                            &function.sig,
                            true,
                        )?),
                        None => bare_impl = true,
                    }
                }
                Item::Fn(function) => declarations.push(Self::from_signature(
                    DeclarationKind::Function,
                    &function.sig,
                    true,
                )?),
                Item::Struct(item) => declarations.push(Self::from_fields(&item.fields)?),
                Item::Trait(item) => {
                    let signature = item.items.iter().find_map(|item| match item {
                        TraitItem::Fn(function) if function.sig.ident == constructor => {
                            Some(&function.sig)
                        }
                        _ => None,
                    });
                    declarations.push(match signature {
                        Some(signature) => {
                            Self::from_signature(DeclarationKind::Trait, signature, false)?
                        }
                        None => Self {
                            kind: DeclarationKind::Trait,
                            has_body: false,
                            parameters: Vec::new(),
                        },
                    });
                }
                // Bodyless `fn` items, with or without visibility, come back
                // as verbatim tokens.
                Item::Verbatim(tokens) => {
                    if let Ok(item) = syn::parse2::<ForeignItemFn>(tokens.clone()) {
                        declarations.push(Self::from_signature(
                            DeclarationKind::Signature,
                            &item.sig,
                            false,
                        )?);
                    }
                }
                _ => {}
            }
        }

        if constructors.len() > 1 {
            return Err(Error::analysis(format!(
                "{} `{}` constructors found, expected one",
                constructors.len(),
                constructor
            )));
        }
        if let Some(found) = constructors.pop() {
            return Ok(found);
        }

        let count = declarations.len();
        let mut candidates = declarations.into_iter();
        match (candidates.next(), candidates.next()) {
            (Some(found), None) => Ok(found),
            (None, _) if bare_impl => Ok(Self {
                kind: DeclarationKind::Impl,
                has_body: true,
                parameters: Vec::new(),
            }),
            (None, _) => Err(Error::analysis("no function or class declaration found")),
            (Some(_), Some(_)) => Err(Error::analysis(format!(
                "ambiguous source: {} candidate declarations found, expected one",
                count
            ))),
        }
    }

    fn from_signature(kind: DeclarationKind, signature: &Signature, has_body: bool) -> Result<Self> {
        let mut parameters = signature
            .inputs
            .iter()
            .filter_map(|input| match input {
                FnArg::Typed(typed) => Some(typed),
                FnArg::Receiver(_) => None,
            })
            .enumerate()
            .map(|(position, typed)| {
                ParameterDescriptor::build(
                    pattern_name(&typed.pat, position),
                    &typed.attrs,
                    Some(&typed.ty),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(variadic) = &signature.variadic {
            let name = variadic
                .pat
                .as_ref()
                .map(|(pat, _)| pattern_name(pat, parameters.len()))
                .unwrap_or_else(|| "args".to_string());
            let mut descriptor = ParameterDescriptor::build(name, &variadic.attrs, None)?;
            descriptor.is_rest = true;
            parameters.push(descriptor);
        }

        Ok(Self {
            kind,
            has_body,
            parameters,
        })
    }

    fn from_fields(fields: &Fields) -> Result<Self> {
        let parameters = fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let name = field
                    .ident
                    .as_ref()
                    .map(|ident| ident.unraw().to_string())
                    .unwrap_or_else(|| position.to_string());
                ParameterDescriptor::build(name, &field.attrs, Some(&field.ty))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind: DeclarationKind::Struct,
            has_body: true,
            parameters,
        })
    }

    fn from_closure(closure: &ExprClosure) -> Result<Self> {
        let parameters = closure
            .inputs
            .iter()
            .enumerate()
            .map(|(position, pat)| match pat {
                Pat::Type(typed) => ParameterDescriptor::build(
                    pattern_name(&typed.pat, position),
                    &typed.attrs,
                    Some(&typed.ty),
                ),
                Pat::Ident(binding) => {
                    ParameterDescriptor::build(pattern_name(pat, position), &binding.attrs, None)
                }
                other => ParameterDescriptor::build(pattern_name(other, position), &[], None),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind: DeclarationKind::Closure,
            has_body: true,
            parameters,
        })
    }
}

/// Ordered view over the parameters of a declaration.
#[derive(Clone, Copy, Debug)]
pub struct ParameterAnalyser<'a> {
    parameters: &'a [ParameterDescriptor],
}

impl<'a> ParameterAnalyser<'a> {
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'a ParameterDescriptor> {
        self.parameters.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'a, ParameterDescriptor> {
        self.parameters.iter()
    }

    /// Parameters the container fills in, i.e. those before any rest parameter.
    pub fn injectable(&self) -> impl Iterator<Item = &'a ParameterDescriptor> + 'a {
        self.parameters.iter().take_while(|parameter| !parameter.is_rest())
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> Vec<&'a str> {
        self.parameters.iter().map(ParameterDescriptor::name).collect()
    }
}

fn pattern_name(pat: &Pat, position: usize) -> String {
    match pat {
        Pat::Ident(binding) => binding.ident.unraw().to_string(),
        Pat::Type(typed) => pattern_name(&typed.pat, position),
        Pat::Reference(reference) => pattern_name(&reference.pat, position),
        _ => format!("arg{}", position),
    }
}

fn parse_hint(attr: &Attribute) -> Result<Reference> {
    let expr: Expr = attr
        .parse_args()
        .map_err(|err| Error::analysis(format!("invalid #[inject] hint: {}", err)))?;

    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(name),
            ..
        }) => Ok(Reference::Name(name.value())),
        Expr::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| Reference::Type(segment.ident.to_string()))
            .ok_or_else(|| Error::analysis("empty #[inject] path")),
        _ => Err(Error::analysis(
            "#[inject] expects a string literal or a type marker",
        )),
    }
}

/// Returns the referenced type name and whether it was wrapped in `Option`.
fn inspect_type(ty: &Type) -> Option<(String, bool)> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let segment = path.path.segments.last()?;
            let ident = segment.ident.to_string();
            if ident == "Option" {
                let (name, _) = first_generic(segment).and_then(inspect_type)?;
                return Some((name, true));
            }
            if WRAPPERS.contains(&ident.as_str()) {
                if let Some(inner) = first_generic(segment) {
                    return inspect_type(inner);
                }
            }
            Some((ident, false))
        }
        Type::Reference(reference) => inspect_type(&reference.elem),
        Type::Paren(paren) => inspect_type(&paren.elem),
        Type::Group(group) => inspect_type(&group.elem),
        Type::TraitObject(object) => trait_name(&object.bounds).map(|name| (name, false)),
        Type::ImplTrait(bound) => trait_name(&bound.bounds).map(|name| (name, false)),
        _ => None,
    }
}

fn first_generic(segment: &PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(arguments) => {
            arguments.args.iter().find_map(|argument| match argument {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
        }
        _ => None,
    }
}

fn trait_name(bounds: &Punctuated<TypeParamBound, Token![+]>) -> Option<String> {
    bounds.iter().find_map(|bound| match bound {
        TypeParamBound::Trait(bound) => bound
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    })
}
