//! Recognized `sbatch` option names
//!
//! Keys are stored in their canonical form: lowercase, words joined by
//! underscores (`job_name`). The external form used in scripts joins words
//! with hyphens (`--job-name`). [`normalize_key`] maps either form to the
//! canonical one.

/// Every option name accepted by [`OptionStore`](super::OptionStore).
///
/// Kept sorted so membership is a binary search.
pub const OPTION_NAMES: &[&str] = &[
    "account",
    "acctg_freq",
    "array",
    "batch",
    "bb",
    "bbf",
    "begin",
    "chdir",
    "checkpoint",
    "checkpoint_dir",
    "cluster_constraint",
    "clusters",
    "comment",
    "constraint",
    "container",
    "container_id",
    "contiguous",
    "core_spec",
    "cores_per_socket",
    "cpu_freq",
    "cpus_per_gpu",
    "cpus_per_task",
    "deadline",
    "delay_boot",
    "dependency",
    "distribution",
    "error",
    "exclude",
    "exclusive",
    "export",
    "export_file",
    "extra",
    "extra_node_info",
    "get_user_env",
    "gid",
    "gpu_bind",
    "gpu_freq",
    "gpus",
    "gpus_per_node",
    "gpus_per_socket",
    "gpus_per_task",
    "gres",
    "gres_flags",
    "hint",
    "hold",
    "ignore_pbs",
    "input",
    "job_name",
    "kill_on_invalid_dep",
    "licenses",
    "mail_type",
    "mail_user",
    "mcs_label",
    "mem",
    "mem_bind",
    "mem_per_cpu",
    "mem_per_gpu",
    "mincpus",
    "network",
    "nice",
    "no_kill",
    "no_requeue",
    "nodefile",
    "nodelist",
    "nodes",
    "ntasks",
    "ntasks_per_core",
    "ntasks_per_gpu",
    "ntasks_per_node",
    "ntasks_per_socket",
    "ntasks_per_tres",
    "oom_kill_step",
    "open_mode",
    "output",
    "overcommit",
    "oversubscribe",
    "parsable",
    "partition",
    "power",
    "prefer",
    "priority",
    "profile",
    "propagate",
    "qos",
    "quiet",
    "reboot",
    "requeue",
    "reservation",
    "segment",
    "signal",
    "sockets_per_node",
    "spread_job",
    "switches",
    "tasks_per_node",
    "test_only",
    "thread_spec",
    "threads_per_core",
    "time",
    "time_min",
    "tmp",
    "tres_bind",
    "tres_per_task",
    "uid",
    "use_min_nodes",
    "verbose",
    "wait",
    "wait_all_nodes",
    "wckey",
    "workdir",
    "wrap",
];

/// Converts a key in any accepted form to its canonical form.
///
/// Surrounding whitespace and leading dashes are stripped, remaining
/// hyphens become underscores: `"--job-name"`, `"job-name"` and
/// `"job_name"` all normalize to `"job_name"`.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches('-')
        .trim()
        .replace('-', "_")
}

/// Converts a canonical key to the hyphenated form written in scripts
pub fn external_key(key: &str) -> String {
    key.replace('_', "-")
}

/// Returns true if the (already normalized) key is a recognized option
pub fn is_known_option(key: &str) -> bool {
    OPTION_NAMES.binary_search(&key).is_ok()
}
