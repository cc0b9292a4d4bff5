use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value an option holds, and therefore how it renders on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Flag,
    Text,
    Integer,
    Float,
    TextList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Flag => "boolean",
            ValueKind::Text => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::TextList => "string list",
        };
        f.write_str(name)
    }
}

/// Borrowed view of a single option value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Flag(bool),
    Text(&'a str),
    Integer(i64),
    Float(f64),
    TextList(&'a [String]),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Flag(_) => ValueKind::Flag,
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Integer(_) => ValueKind::Integer,
            FieldValue::Float(_) => ValueKind::Float,
            FieldValue::TextList(_) => ValueKind::TextList,
        }
    }

    /// Whether the value is its kind's zero value, i.e. "not specified".
    ///
    /// Floats compare by bit pattern, so only `+0.0` counts as unset.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Flag(b) => !b,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Integer(n) => *n == 0,
            FieldValue::Float(x) => x.to_bits() == 0,
            FieldValue::TextList(items) => items.is_empty(),
        }
    }
}

impl<'a> From<&'a bool> for FieldValue<'a> {
    fn from(value: &'a bool) -> Self {
        FieldValue::Flag(*value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<&'a i64> for FieldValue<'a> {
    fn from(value: &'a i64) -> Self {
        FieldValue::Integer(*value)
    }
}

impl<'a> From<&'a f64> for FieldValue<'a> {
    fn from(value: &'a f64) -> Self {
        FieldValue::Float(*value)
    }
}

impl<'a> From<&'a Vec<String>> for FieldValue<'a> {
    fn from(value: &'a Vec<String>) -> Self {
        FieldValue::TextList(value)
    }
}

/// One row of an option table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Key in the configuration document.
    pub key: &'static str,
    /// Flag the option renders to.
    pub flag: &'static str,
    pub kind: ValueKind,
}

/// A typed configuration record that can be rendered into arguments.
///
/// `values()` must yield one entry per descriptor, in the same order.
pub trait ConfigRecord {
    fn fields(&self) -> &'static [FieldDescriptor];
    fn values(&self) -> Vec<FieldValue<'_>>;
}

macro_rules! field_type {
    (Flag) => { bool };
    (Text) => { String };
    (Integer) => { i64 };
    (Float) => { f64 };
    (TextList) => { Vec<String> };
}

// Generates the struct, its option table and the `ConfigRecord` impl from a
// single list so the three cannot drift apart.
macro_rules! llama_config {
    (
        $(
            $(#[$meta:meta])*
            $field:ident: $kind:ident = $key:literal $(| $alias:literal)* => $flag:literal,
        )*
    ) => {
        /// Options understood by `llama-server`, in command-line order.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct LlamaConfig {
            $(
                $(#[$meta])*
                #[serde(rename = $key $(, alias = $alias)*)]
                pub $field: field_type!($kind),
            )*
        }

        /// Option table for [`LlamaConfig`], in declaration order.
        pub static LLAMA_FIELDS: &[FieldDescriptor] = &[
            $(
                FieldDescriptor {
                    name: stringify!($field),
                    key: $key,
                    flag: $flag,
                    kind: ValueKind::$kind,
                },
            )*
        ];

        impl ConfigRecord for LlamaConfig {
            fn fields(&self) -> &'static [FieldDescriptor] {
                LLAMA_FIELDS
            }

            fn values(&self) -> Vec<FieldValue<'_>> {
                vec![$(FieldValue::from(&self.$field),)*]
            }
        }
    };
}

llama_config! {
    // Basic server configuration
    /// Path to the model file.
    model_path: Text = "model" => "--model",
    model_url: Text = "model-url" => "--model-url",
    host: Text = "host" => "--host",
    port: Integer = "port" => "--port",
    /// Directory to serve static files from.
    path: Text = "path" => "--path",
    api_prefix: Text = "api-prefix" => "--api-prefix",
    no_webui: Flag = "no-webui" => "--no-webui",
    /// Server read/write timeout in seconds.
    timeout: Integer = "timeout" => "--timeout",
    threads_http: Integer = "threads-http" => "--threads-http",

    // Model loading
    hf_repo: Text = "hf-repo" => "--hf-repo",
    hf_file: Text = "hf-file" => "--hf-file",
    hf_token: Text = "hf-token" => "--hf-token",
    offline: Flag = "offline" => "--offline",

    // Performance and resources
    threads: Integer = "threads" => "--threads",
    threads_batch: Integer = "threads-batch" => "--threads-batch",
    cpu_mask: Text = "cpu-mask" => "--cpu-mask",
    cpu_range: Text = "cpu-range" => "--cpu-range",
    cpu_strict: Integer = "cpu-strict" => "--cpu-strict",
    priority: Integer = "prio" => "--prio",
    poll: Integer = "poll" => "--poll",
    context_size: Integer = "n-ctx" | "ctx-size" => "--ctx-size",
    batch_size: Integer = "batch-size" => "--batch-size",
    ubatch_size: Integer = "ubatch-size" => "--ubatch-size",
    gpu_layers: Integer = "n-gpu-layers" => "--n-gpu-layers",
    split_mode: Text = "split-mode" => "--split-mode",
    tensor_split: Text = "tensor-split" => "--tensor-split",
    main_gpu: Integer = "main-gpu" => "--main-gpu",
    numa: Text = "numa" => "--numa",
    device: Text = "device" => "--device",

    // Memory management
    mlock: Flag = "mlock" => "--mlock",
    no_mmap: Flag = "no-mmap" => "--no-mmap",
    cache_type_k: Text = "cache-type-k" => "--cache-type-k",
    cache_type_v: Text = "cache-type-v" => "--cache-type-v",
    cache_reuse: Integer = "cache-reuse" => "--cache-reuse",
    swa_full: Flag = "swa-full" => "--swa-full",
    kv_unified: Flag = "kv-unified" => "--kv-unified",

    // RoPE
    rope_scaling: Text = "rope-scaling" => "--rope-scaling",
    rope_scale: Float = "rope-scale" => "--rope-scale",
    rope_freq_base: Float = "rope-freq-base" => "--rope-freq-base",
    rope_freq_scale: Float = "rope-freq-scale" => "--rope-freq-scale",

    // YaRN
    yarn_orig_ctx: Integer = "yarn-orig-ctx" => "--yarn-orig-ctx",
    yarn_ext_factor: Float = "yarn-ext-factor" => "--yarn-ext-factor",
    yarn_attn_factor: Float = "yarn-attn-factor" => "--yarn-attn-factor",
    yarn_beta_slow: Float = "yarn-beta-slow" => "--yarn-beta-slow",
    yarn_beta_fast: Float = "yarn-beta-fast" => "--yarn-beta-fast",

    // Sampling
    seed: Integer = "seed" => "--seed",
    samplers: Text = "samplers" => "--samplers",
    sampler_seq: Text = "sampler-seq" | "sampling-seq" => "--sampling-seq",
    ignore_eos: Flag = "ignore-eos" => "--ignore-eos",
    temperature: Float = "temp" => "--temp",
    top_k: Integer = "top-k" => "--top-k",
    top_p: Float = "top-p" => "--top-p",
    min_p: Float = "min-p" => "--min-p",
    top_n_sigma: Float = "top-nsigma" => "--top-nsigma",
    typical: Float = "typical" => "--typical",
    repeat_last_n: Integer = "repeat-last-n" => "--repeat-last-n",
    repeat_penalty: Float = "repeat-penalty" => "--repeat-penalty",
    presence_penalty: Float = "presence-penalty" => "--presence-penalty",
    frequency_penalty: Float = "frequency-penalty" => "--frequency-penalty",
    mirostat: Integer = "mirostat" => "--mirostat",
    mirostat_lr: Float = "mirostat-lr" => "--mirostat-lr",
    mirostat_ent: Float = "mirostat-ent" => "--mirostat-ent",

    // Grammar and constraints
    grammar: Text = "grammar" => "--grammar",
    grammar_file: Text = "grammar-file" => "--grammar-file",
    json_schema: Text = "json-schema" => "--json-schema",
    json_schema_file: Text = "json-schema-file" => "--json-schema-file",

    // Adapters and extensions
    /// LoRA adapters; the flag is repeated once per entry.
    lora_adapters: TextList = "lora" => "--lora",
    lora_scaled: TextList = "lora-scaled" => "--lora-scaled",
    mmproj: Text = "mmproj" => "--mmproj",
    mmproj_url: Text = "mmproj-url" => "--mmproj-url",
    no_mmproj: Flag = "no-mmproj" => "--no-mmproj",
    no_mmproj_offload: Flag = "no-mmproj-offload" => "--no-mmproj-offload",

    // Server features
    cont_batching: Flag = "cont-batching" => "--cont-batching",
    no_cont_batching: Flag = "no-cont-batching" => "--no-cont-batching",
    metrics: Flag = "metrics" => "--metrics",
    slots: Flag = "slots" => "--slots",
    no_slots: Flag = "no-slots" => "--no-slots",
    slot_save_path: Text = "slot-save-path" => "--slot-save-path",
    slot_prompt_similarity: Float = "slot-prompt-similarity" => "--slot-prompt-similarity",
    swa_checkpoints: Integer = "swa-checkpoints" => "--swa-checkpoints",

    // Authentication and security
    api_key: Text = "api-key" => "--api-key",
    api_key_file: Text = "api-key-file" => "--api-key-file",
    ssl_key_file: Text = "ssl-key-file" => "--ssl-key-file",
    ssl_cert_file: Text = "ssl-cert-file" => "--ssl-cert-file",

    // Chat templates
    chat_template: Text = "chat-template" => "--chat-template",
    chat_template_file: Text = "chat-template-file" => "--chat-template-file",
    chat_template_kwargs: Text = "chat-template-kwargs" => "--chat-template-kwargs",
    jinja: Flag = "jinja" => "--jinja",
    no_prefill_assistant: Flag = "no-prefill-assistant" => "--no-prefill-assistant",
    reasoning_format: Text = "reasoning-format" => "--reasoning-format",
    reasoning_budget: Integer = "reasoning-budget" => "--reasoning-budget",

    // Special modes
    embedding: Flag = "embedding" => "--embedding",
    reranking: Flag = "reranking" => "--reranking",
    pooling: Text = "pooling" => "--pooling",

    // Logging
    verbose: Flag = "verbose" => "--verbose",
    log_disable: Flag = "log-disable" => "--log-disable",
    log_file: Text = "log-file" => "--log-file",
    log_colors: Flag = "log-colors" => "--log-colors",
    log_verbosity: Integer = "log-verbosity" => "--log-verbosity",
    log_prefix: Flag = "log-prefix" => "--log-prefix",
    log_timestamps: Flag = "log-timestamps" => "--log-timestamps",

    // Prediction and generation
    predict: Integer = "n-predict" | "predict" => "--predict",
    reverse_prompt: Text = "reverse-prompt" => "--reverse-prompt",
    special: Flag = "special" => "--special",
    no_warmup: Flag = "no-warmup" => "--no-warmup",
    no_context_shift: Flag = "no-context-shift" => "--no-context-shift",
    context_shift: Flag = "context-shift" => "--context-shift",
    keep: Integer = "keep" => "--keep",

    // Speculative decoding
    model_draft: Text = "model-draft" => "--model-draft",
    threads_draft: Integer = "threads-draft" => "--threads-draft",
    threads_batch_draft: Integer = "threads-batch-draft" => "--threads-batch-draft",
    context_size_draft: Integer = "ctx-size-draft" => "--ctx-size-draft",
    device_draft: Text = "device-draft" => "--device-draft",
    gpu_layers_draft: Integer = "n-gpu-layers-draft" | "gpu-layers-draft" => "--gpu-layers-draft",
    draft_max: Integer = "draft-max" => "--draft-max",
    draft_min: Integer = "draft-min" => "--draft-min",
    draft_p_min: Float = "draft-p-min" => "--draft-p-min",
}
