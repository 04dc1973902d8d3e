//! Sink that prints records instead of applying them.

use async_trait::async_trait;
use ldaptools_core::Result;
use ldaptools_ldif::{DirectoryMutationSink, DistinguishedName, LdifDocument, LINE_SEPARATOR};

/// Writes each operation to stdout, prefixed by a comment naming the tool that would run.
#[derive(Debug, Default)]
pub struct DryRunSink;

fn render(tool: &str, bind: &DistinguishedName, body: &str) -> String {
    format!("# {tool} -D {bind} -W{LINE_SEPARATOR}{body}{LINE_SEPARATOR}")
}

#[async_trait]
impl DirectoryMutationSink for DryRunSink {
    async fn add(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()> {
        print!("{}", render("ldapadd", bind, &document.to_text()));
        Ok(())
    }

    async fn modify(&self, bind: &DistinguishedName, document: &LdifDocument) -> Result<()> {
        print!("{}", render("ldapmodify", bind, &document.to_text()));
        Ok(())
    }

    async fn delete(&self, bind: &DistinguishedName, target: &DistinguishedName) -> Result<()> {
        print!("{}", render("ldapdelete", bind, &target.to_string()));
        Ok(())
    }
}
