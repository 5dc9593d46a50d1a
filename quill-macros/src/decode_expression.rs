use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote};
use syn::{
    BinOp, Expr, ExprClosure, ExprIf, ExprLit, ExprPath, Lit, Member, Pat, PatIdent, PatType,
    Path, Stmt, UnOp,
};

/// Identifiers compiled as static members and calls instead of host values.
const NAMESPACES: &[&str] = &[
    "DateTime", "Date", "Time", "Interval", "Math", "Str", "Seq", "Sql", "Uuid",
];

struct Scope {
    params: Vec<String>,
}

impl Scope {
    fn param(&self, path: &Path) -> Option<usize> {
        let ident = path.get_ident()?.to_string();
        self.params.iter().position(|v| *v == ident && v != "_")
    }

    /// Whether the tokens mention a lambda parameter or a namespace, everything else is a value
    /// the closure captures from the host.
    fn references(&self, tokens: TokenStream) -> bool {
        let mut after_dot = false;
        let mut tokens = tokens.into_iter().peekable();
        while let Some(token) = tokens.next() {
            match &token {
                TokenTree::Group(group) => {
                    if self.references(group.stream()) {
                        return true;
                    }
                    after_dot = false;
                }
                TokenTree::Ident(ident) => {
                    let name = ident.to_string();
                    if !after_dot && name != "_" && self.params.contains(&name) {
                        return true;
                    }
                    if !after_dot
                        && NAMESPACES.contains(&name.as_str())
                        && matches!(tokens.peek(), Some(TokenTree::Punct(p)) if p.as_char() == ':')
                    {
                        return true;
                    }
                    after_dot = false;
                }
                TokenTree::Punct(punct) => after_dot = punct.as_char() == '.',
                TokenTree::Literal(..) => after_dot = false,
            }
        }
        false
    }
}

fn namespace(path: &Path) -> Option<(TokenStream, String)> {
    if path.segments.len() != 2 {
        return None;
    }
    let declaring = path.segments[0].ident.to_string();
    if !NAMESPACES.contains(&declaring.as_str()) {
        return None;
    }
    let declaring = syn::Ident::new(&declaring, path.segments[0].ident.span());
    Some((
        quote!(::quill::TypeKey::#declaring),
        path.segments[1].ident.to_string(),
    ))
}

fn binary_op(op: &BinOp) -> TokenStream {
    match op {
        BinOp::Add(..) | BinOp::AddAssign(..) => quote!(::quill::BinaryOp::Add),
        BinOp::Sub(..) | BinOp::SubAssign(..) => quote!(::quill::BinaryOp::Subtract),
        BinOp::Mul(..) | BinOp::MulAssign(..) => quote!(::quill::BinaryOp::Multiply),
        BinOp::Div(..) | BinOp::DivAssign(..) => quote!(::quill::BinaryOp::Divide),
        BinOp::Rem(..) | BinOp::RemAssign(..) => quote!(::quill::BinaryOp::Remainder),
        BinOp::And(..) => quote!(::quill::BinaryOp::And),
        BinOp::Or(..) => quote!(::quill::BinaryOp::Or),
        BinOp::BitAnd(..) | BinOp::BitAndAssign(..) => quote!(::quill::BinaryOp::BitAnd),
        BinOp::BitOr(..) | BinOp::BitOrAssign(..) => quote!(::quill::BinaryOp::BitOr),
        BinOp::BitXor(..) | BinOp::BitXorAssign(..) => quote!(::quill::BinaryOp::BitXor),
        BinOp::Shl(..) | BinOp::ShlAssign(..) => quote!(::quill::BinaryOp::ShiftLeft),
        BinOp::Shr(..) | BinOp::ShrAssign(..) => quote!(::quill::BinaryOp::ShiftRight),
        BinOp::Eq(..) => quote!(::quill::BinaryOp::Equal),
        BinOp::Ne(..) => quote!(::quill::BinaryOp::NotEqual),
        BinOp::Lt(..) => quote!(::quill::BinaryOp::Less),
        BinOp::Le(..) => quote!(::quill::BinaryOp::LessEqual),
        BinOp::Gt(..) => quote!(::quill::BinaryOp::Greater),
        BinOp::Ge(..) => quote!(::quill::BinaryOp::GreaterEqual),
        _ => panic!("Unsupported operator `{}`", op.to_token_stream()),
    }
}

fn decode_args<'a>(scope: &Scope, args: impl IntoIterator<Item = &'a Expr>) -> TokenStream {
    let args = args.into_iter().map(|v| decode_expression(scope, v));
    quote!(vec![#(#args),*])
}

fn decode_if(scope: &Scope, v: &ExprIf) -> TokenStream {
    let test = decode_expression(scope, &v.cond);
    let then = decode_block(scope, &v.then_branch.stmts);
    let Some((_, otherwise)) = &v.else_branch else {
        panic!("An `if` inside an expression requires an `else` branch");
    };
    let otherwise = decode_expression(scope, otherwise);
    quote!(::quill::Expr::conditional(#test, #then, #otherwise))
}

fn decode_block(scope: &Scope, stmts: &[Stmt]) -> TokenStream {
    match stmts {
        [Stmt::Expr(v, None)] => decode_expression(scope, v),
        _ => panic!("A block inside an expression must contain a single expression"),
    }
}

fn decode_expression(scope: &Scope, expr: &Expr) -> TokenStream {
    match expr {
        Expr::Paren(v) => return decode_expression(scope, &v.expr),
        Expr::Reference(v) => return decode_expression(scope, &v.expr),
        Expr::Group(v) => return decode_expression(scope, &v.expr),
        _ => {}
    }
    if !scope.references(expr.to_token_stream()) {
        return match expr {
            Expr::Path(ExprPath { path, .. }) if path.is_ident("None") => {
                quote!(::quill::Expr::null())
            }
            Expr::Lit(ExprLit {
                lit: Lit::Str(..) | Lit::Int(..) | Lit::Float(..) | Lit::Bool(..) | Lit::Char(..),
                ..
            })
            | Expr::Path(..)
            | Expr::Field(..)
            | Expr::MethodCall(..)
            | Expr::Call(..)
            | Expr::Macro(..)
            | Expr::Unary(..)
            | Expr::Binary(..)
            | Expr::Index(..)
            | Expr::Cast(..)
            | Expr::Array(..)
            | Expr::Block(..)
            | Expr::If(..)
            | Expr::Tuple(..)
            | Expr::Struct(..) => quote!(::quill::Expr::captured(&(#expr))),
            _ => panic!(
                "Unexpected expression `{}`",
                expr.to_token_stream().to_string()
            ),
        };
    }
    match expr {
        Expr::Path(ExprPath { path, .. }) => {
            if let Some(i) = scope.param(path) {
                return quote!(::quill::Expr::param(#i));
            }
            if let Some((declaring, name)) = namespace(path) {
                return quote!(::quill::Expr::static_member(#declaring, #name));
            }
            panic!("Unexpected path `{}`", path.to_token_stream().to_string())
        }
        Expr::Field(v) => {
            let Member::Named(name) = &v.member else {
                panic!("Tuple fields are not supported in expressions");
            };
            let target = decode_expression(scope, &v.base);
            let name = name.to_string();
            quote!(#target.member(#name))
        }
        Expr::MethodCall(v) => {
            let name = v.method.to_string();
            let target = decode_expression(scope, &v.receiver);
            match (name.as_str(), v.args.len()) {
                ("unwrap_or", 1) => {
                    let fallback = decode_expression(scope, &v.args[0]);
                    quote!(::quill::Expr::binary(::quill::BinaryOp::Coalesce, #target, #fallback))
                }
                ("clone" | "to_owned" | "as_str" | "as_ref", 0) => target,
                _ => {
                    let args = decode_args(scope, &v.args);
                    quote!(#target.call(#name, #args))
                }
            }
        }
        Expr::Call(v) => {
            let Expr::Path(ExprPath { path, .. }) = v.func.as_ref() else {
                panic!(
                    "Unexpected call `{}`",
                    v.func.to_token_stream().to_string()
                );
            };
            if path.is_ident("Some") && v.args.len() == 1 {
                return decode_expression(scope, &v.args[0]);
            }
            let Some((declaring, name)) = namespace(path) else {
                panic!(
                    "Unknown function `{}`, only the namespaces {} can be called with arguments from the query",
                    path.to_token_stream().to_string(),
                    NAMESPACES.join(", ")
                );
            };
            let args = decode_args(scope, &v.args);
            quote!(::quill::Expr::static_call(#declaring, #name, #args))
        }
        Expr::Binary(v) => {
            let op = binary_op(&v.op);
            let lhs = decode_expression(scope, &v.left);
            let rhs = decode_expression(scope, &v.right);
            quote!(::quill::Expr::binary(#op, #lhs, #rhs))
        }
        Expr::Unary(v) => {
            let operand = decode_expression(scope, &v.expr);
            match v.op {
                UnOp::Not(..) => quote!(::quill::Expr::unary(::quill::UnaryOp::Not, #operand)),
                UnOp::Neg(..) => quote!(::quill::Expr::unary(::quill::UnaryOp::Negate, #operand)),
                UnOp::Deref(..) => operand,
                _ => panic!("Unsupported operator `{}`", v.op.to_token_stream()),
            }
        }
        Expr::Block(v) => decode_block(scope, &v.block.stmts),
        Expr::If(v) => decode_if(scope, v),
        Expr::Cast(v) => {
            let operand = decode_expression(scope, &v.expr);
            let ty = &v.ty;
            quote!(#operand.convert(<#ty as ::quill::AsValue>::as_empty_value()))
        }
        Expr::Tuple(v) => {
            let items = v.elems.iter().map(|v| decode_expression(scope, v));
            quote!(::quill::Expr::Tuple(vec![#(#items),*]))
        }
        Expr::Array(v) => {
            let items = v.elems.iter().map(|v| decode_expression(scope, v));
            quote!(::quill::Expr::List(vec![#(#items),*]))
        }
        Expr::Struct(v) => {
            if v.rest.is_some() {
                panic!("Struct update syntax is not supported in a projection");
            }
            let fields = v.fields.iter().map(|field| {
                let Member::Named(name) = &field.member else {
                    panic!("Projection fields must be named");
                };
                let name = name.to_string();
                let value = decode_expression(scope, &field.expr);
                quote!((::std::borrow::Cow::Borrowed(#name), #value))
            });
            quote!(::quill::Expr::New(vec![#(#fields),*]))
        }
        _ => panic!(
            "Unexpected expression `{}`",
            expr.to_token_stream().to_string()
        ),
    }
}

fn decode_param(pat: &Pat) -> TokenStream {
    match pat {
        Pat::Type(PatType { pat, ty, .. }) => {
            let name = param_name(pat);
            quote!(::quill::LambdaParam::of::<#ty>(#name))
        }
        pat => {
            let name = param_name(pat);
            quote!(::quill::LambdaParam::any(#name))
        }
    }
}

fn param_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(PatIdent { ident, .. }) => ident.to_string(),
        Pat::Wild(..) => "_".into(),
        _ => panic!(
            "Unexpected lambda parameter `{}`, use a plain name like `|o: Order|`",
            pat.to_token_stream().to_string()
        ),
    }
}

/// Closure (or bare expression without parameters) to a `Lambda`.
pub fn decode_lambda(input: &Expr) -> TokenStream {
    let (params, body) = match input {
        Expr::Closure(ExprClosure { inputs, body, .. }) => {
            let params = inputs.iter().collect::<Vec<_>>();
            (params, body.as_ref())
        }
        body => (Vec::new(), body),
    };
    let scope = Scope {
        params: params
            .iter()
            .map(|v| match v {
                Pat::Type(PatType { pat, .. }) => param_name(pat),
                v => param_name(v),
            })
            .collect(),
    };
    let param_defs = params.iter().map(|v| decode_param(v));
    let body = decode_expression(&scope, body);
    quote! {
        ::quill::Lambda::new(vec![#(#param_defs),*], #body)
    }
}
