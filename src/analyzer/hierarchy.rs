use super::Analyzer;
use crate::core::error::Result;
use crate::extract::ClassHierarchy;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::collections::HashSet;
use tracing::debug;

impl Analyzer {
    /// Resolve a class and, recursively and concurrently, its superclasses.
    ///
    /// Only the root class must exist. A superclass that cannot be resolved
    /// is dropped from its parent's list, and a superclass already on the
    /// current inheritance path is dropped instead of followed.
    pub async fn find_class_hierarchy(
        &self,
        class_name: &str,
        include_interfaces: bool,
    ) -> Result<ClassHierarchy> {
        self.workspace()?;
        self.resolve_hierarchy(class_name.to_string(), include_interfaces, HashSet::new())
            .await
    }

    fn resolve_hierarchy(
        &self,
        class_name: String,
        include_interfaces: bool,
        mut ancestors: HashSet<String>,
    ) -> BoxFuture<'_, Result<ClassHierarchy>> {
        async move {
            let class = self.analyze_class(&class_name).await?;
            ancestors.insert(class_name.clone());

            let parents: Vec<&String> = class
                .superclasses
                .iter()
                .filter(|name| {
                    let cyclic = ancestors.contains(name.as_str());
                    if cyclic {
                        debug!(class = %class_name, superclass = %name, "Inheritance cycle, skipping");
                    }
                    !cyclic
                })
                .collect();

            let branches = parents.iter().map(|name| {
                self.resolve_hierarchy((*name).clone(), include_interfaces, ancestors.clone())
            });

            let superclasses = join_all(branches)
                .await
                .into_iter()
                .zip(&parents)
                .filter_map(|(resolved, name)| match resolved {
                    Ok(node) => Some(node),
                    Err(e) => {
                        debug!(superclass = %name, error = %e, "Superclass unresolved, omitting");
                        None
                    }
                })
                .collect();

            Ok(ClassHierarchy {
                class_name,
                superclasses,
                interfaces: include_interfaces.then(|| class.interfaces.clone()),
            })
        }
        .boxed()
    }
}
