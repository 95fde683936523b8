use layercraft::prelude::*;

/// Mock PackageInstaller for testing that reports a fixed package set
#[derive(Default, Clone)]
pub struct MockPackageInstaller {
    packages: Vec<InstalledPackage>,
    failure: Option<String>,
}

impl MockPackageInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, name: &str, version: &str) -> Self {
        let mut package = ResolvedPackage::new(name, version);
        package.license = "MIT".to_string();
        package.architecture = "x86_64".to_string();
        self.packages.push(InstalledPackage {
            package,
            paths: vec![],
        });
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            packages: vec![],
            failure: Some(message.to_string()),
        }
    }
}

impl PackageInstaller for MockPackageInstaller {
    fn fixate_world(&self, _tree: &mut dyn FilesystemTree) -> Result<()> {
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    fn installed_packages(&self, _tree: &dyn FilesystemTree) -> Result<Vec<InstalledPackage>> {
        Ok(self.packages.clone())
    }
}
