pub mod compile;
pub mod parsing;
pub mod token_stream;
pub mod tokens;

use compile::{AstBuilder, CodeGen, CompileError, CompilerConf, CompilerContext, Program};
use parsing::DerivationTree;
use token_stream::TokenStream;

/// Parse token stream text into a derivation tree.
pub fn parse_str(tokens: &str) -> Result<DerivationTree, CompileError> {
    // Token stream
    let stream = TokenStream::from_text(tokens)?;

    // Syntactic analysis
    let tree = parsing::parse(stream)?;

    Ok(tree)
}

/// Build the syntax tree of a derivation tree, resolving every reference.
pub fn check_tree(tree: &DerivationTree, conf: &CompilerConf) -> Result<Program, CompileError> {
    let mut ctx = CompilerContext::new(conf.clone());
    AstBuilder::from_tree(&mut ctx, tree).build()
}

/// Generate the FRISC listing for a derivation tree.
pub fn build_tree(tree: &DerivationTree, conf: &CompilerConf) -> Result<String, CompileError> {
    let mut ctx = CompilerContext::new(conf.clone());

    // Semantic analysis
    let program = AstBuilder::from_tree(&mut ctx, tree).build()?;

    // Code generation
    Ok(CodeGen::new(&mut ctx).compile(&program))
}

/// Compile token stream text all the way to a FRISC listing.
pub fn compile_str(tokens: &str, conf: &CompilerConf) -> Result<String, CompileError> {
    let tree = parse_str(tokens)?;
    build_tree(&tree, conf)
}
