use std::fmt;

/// Named steps of the filesystem mutation pipeline.
///
/// `ORDER` is the only order the pipeline runs them in: each step reads
/// state its predecessors left in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    InstallPackages,
    AdditionalTags,
    MutateAccounts,
    MutatePaths,
    GenerateOsRelease,
    WriteSupervisionTree,
    InstallBusyboxLinks,
    InstallLdconfigLinks,
    InstallCharDevices,
}

impl BuildStep {
    pub const ORDER: [BuildStep; 9] = [
        BuildStep::InstallPackages,
        BuildStep::AdditionalTags,
        BuildStep::MutateAccounts,
        BuildStep::MutatePaths,
        BuildStep::GenerateOsRelease,
        BuildStep::WriteSupervisionTree,
        BuildStep::InstallBusyboxLinks,
        BuildStep::InstallLdconfigLinks,
        BuildStep::InstallCharDevices,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildStep::InstallPackages => "install-packages",
            BuildStep::AdditionalTags => "additional-tags",
            BuildStep::MutateAccounts => "mutate-accounts",
            BuildStep::MutatePaths => "mutate-paths",
            BuildStep::GenerateOsRelease => "generate-os-release",
            BuildStep::WriteSupervisionTree => "write-supervision-tree",
            BuildStep::InstallBusyboxLinks => "install-busybox-links",
            BuildStep::InstallLdconfigLinks => "install-ldconfig-links",
            BuildStep::InstallCharDevices => "install-char-devices",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
