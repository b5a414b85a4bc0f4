//! gluster 命令构造
//!
//! 每个子系统有固定的前缀（`volume`、`volume quota`、`snapshot` 等），
//! 前缀总是位于用户参数之前；请求 XML 输出时 `--xml` 总是最后一个参数。

use std::fmt;

/// 命令所属子系统
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// 无前缀（如 `--version`、`pool list`、`nfs-ganesha`）
    Global,
    /// `volume`
    Volume,
    /// `peer`
    Peer,
    /// `volume geo-replication`
    GeoReplication,
    /// `volume bitrot`
    Bitrot,
    /// `volume quota`
    Quota,
    /// `volume heal`
    Heal,
    /// `volume tier`
    Tier,
    /// `snapshot`
    Snapshot,
    /// `system:: execute`
    System,
}

impl Subsystem {
    /// 子系统前缀
    pub fn prefix(&self) -> &'static [&'static str] {
        match self {
            Self::Global => &[],
            Self::Volume => &["volume"],
            Self::Peer => &["peer"],
            Self::GeoReplication => &["volume", "geo-replication"],
            Self::Bitrot => &["volume", "bitrot"],
            Self::Quota => &["volume", "quota"],
            Self::Heal => &["volume", "heal"],
            Self::Tier => &["volume", "tier"],
            Self::Snapshot => &["snapshot"],
            Self::System => &["system::", "execute"],
        }
    }
}

/// 一条待执行的 gluster 命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlusterCommand {
    subsystem: Subsystem,
    args: Vec<String>,
    xml: bool,
}

impl GlusterCommand {
    /// 创建指定子系统的命令
    pub fn new(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            args: Vec::new(),
            xml: false,
        }
    }

    pub fn global() -> Self {
        Self::new(Subsystem::Global)
    }

    pub fn volume() -> Self {
        Self::new(Subsystem::Volume)
    }

    pub fn peer() -> Self {
        Self::new(Subsystem::Peer)
    }

    pub fn georep() -> Self {
        Self::new(Subsystem::GeoReplication)
    }

    pub fn bitrot() -> Self {
        Self::new(Subsystem::Bitrot)
    }

    pub fn quota() -> Self {
        Self::new(Subsystem::Quota)
    }

    pub fn heal() -> Self {
        Self::new(Subsystem::Heal)
    }

    pub fn tier() -> Self {
        Self::new(Subsystem::Tier)
    }

    pub fn snapshot() -> Self {
        Self::new(Subsystem::Snapshot)
    }

    pub fn system() -> Self {
        Self::new(Subsystem::System)
    }

    /// 追加一个参数
    pub fn arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// 追加多个参数
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    /// 条件成立时追加一个参数
    pub fn flag(self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.arg(name)
        } else {
            self
        }
    }

    /// 值存在时追加 `key value`
    pub fn opt<T: fmt::Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.arg(key).arg(v),
            None => self,
        }
    }

    /// 值存在时追加该值
    pub fn arg_opt<T: fmt::Display>(self, value: Option<T>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self,
        }
    }

    /// 请求 XML 输出
    pub fn xml(mut self) -> Self {
        self.xml = true;
        self
    }

    /// 是否请求 XML 输出
    pub fn expects_xml(&self) -> bool {
        self.xml
    }

    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    /// 用户参数（不含前缀和 --xml）
    pub fn user_args(&self) -> &[String] {
        &self.args
    }

    /// 完整参数：前缀 + 用户参数 + [--xml]
    pub fn tokens(&self) -> Vec<String> {
        let prefix = self.subsystem.prefix();
        let mut tokens = Vec::with_capacity(prefix.len() + self.args.len() + 1);
        tokens.extend(prefix.iter().map(|p| p.to_string()));
        tokens.extend(self.args.iter().cloned());
        if self.xml {
            tokens.push("--xml".to_string());
        }
        tokens
    }
}

impl fmt::Display for GlusterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_precedes_user_args() {
        let cmd = GlusterCommand::georep().arg("gv0").arg("root@h2::gv1").arg("status").xml();
        assert_eq!(
            cmd.tokens(),
            vec!["volume", "geo-replication", "gv0", "root@h2::gv1", "status", "--xml"]
        );
        assert!(cmd.expects_xml());
    }

    #[test]
    fn test_xml_flag_is_last() {
        let cmd = GlusterCommand::volume().xml().arg("info").arg("gv0");
        assert_eq!(cmd.tokens().last().map(String::as_str), Some("--xml"));
        assert_eq!(cmd.tokens(), vec!["volume", "info", "gv0", "--xml"]);
    }

    #[test]
    fn test_conditional_args() {
        let cmd = GlusterCommand::volume()
            .arg("create")
            .arg("gv0")
            .opt("replica", Some(3))
            .opt::<u32>("stripe", None)
            .flag("force", false)
            .arg_opt(Some("extra"));
        assert_eq!(cmd.tokens(), vec!["volume", "create", "gv0", "replica", "3", "extra"]);
        assert!(!cmd.expects_xml());
    }

    #[test]
    fn test_system_prefix() {
        let cmd = GlusterCommand::system().arg("gsec_create");
        assert_eq!(cmd.tokens(), vec!["system::", "execute", "gsec_create"]);
        assert_eq!(cmd.to_string(), "system:: execute gsec_create");
    }

    #[test]
    fn test_building_is_idempotent() {
        let build = || {
            GlusterCommand::quota()
                .arg("gv0")
                .arg("limit-usage")
                .arg("/data")
                .arg("10GB")
                .arg_opt(Some(80))
        };
        assert_eq!(build(), build());
        assert_eq!(build().tokens(), build().tokens());
    }
}
