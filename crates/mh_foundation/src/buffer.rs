// crates/mh_foundation/src/buffer.rs

//! 幽灵层交换用的字节缓冲区
//!
//! [`SendBuffer`] 顺序追加，[`RecvBuffer`] 按同样顺序提取。
//! 数值以本机字节序按 `bytemuck::Pod` 原样写入；字符串为 `u64` 长度前缀 + UTF-8 字节。
//!
//! # 格式
//!
//! ```text
//! 数值:   [size_of::<T>() bytes]
//! 字符串: [len: u64][bytes]
//! 字典:   [count: u64] { [name: 字符串][value: T] } * count
//! ```
//!
//! 缓冲区只负责编码，跨块/跨进程传输由调用方完成。

use bytemuck::Pod;
use std::collections::BTreeMap;

use crate::error::{MhError, MhResult};

/// 发送缓冲区
#[derive(Debug, Clone, Default)]
pub struct SendBuffer {
    data: Vec<u8>,
}

impl SendBuffer {
    /// 创建空缓冲区
    pub fn new() -> Self {
        Self::default()
    }

    /// 预分配容量
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// 追加一个 POD 值
    #[inline]
    pub fn put<T: Pod>(&mut self, value: T) -> &mut Self {
        self.data.extend_from_slice(bytemuck::bytes_of(&value));
        self
    }

    /// 追加字符串
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put(s.len() as u64);
        self.data.extend_from_slice(s.as_bytes());
        self
    }

    /// 追加 名称→值 字典（按键有序）
    pub fn put_mapping<T: Pod>(&mut self, mapping: &BTreeMap<String, T>) -> &mut Self {
        self.put(mapping.len() as u64);
        for (name, &value) in mapping {
            self.put_str(name);
            self.put(value);
        }
        self
    }

    /// 已写入字节数
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 字节视图
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 取出字节
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// 清空
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// 接收缓冲区
#[derive(Debug, Clone, Default)]
pub struct RecvBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl RecvBuffer {
    /// 由字节创建
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 提取一个 POD 值
    pub fn get<T: Pod>(&mut self) -> MhResult<T> {
        let bytes = self.take(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// 提取字符串
    pub fn get_string(&mut self) -> MhResult<String> {
        let len = self.get::<u64>()? as usize;
        let bytes = self.take(len)?.to_vec();
        Ok(String::from_utf8(bytes)?)
    }

    /// 提取 名称→值 字典
    pub fn get_mapping<T: Pod>(&mut self) -> MhResult<BTreeMap<String, T>> {
        let count = self.get::<u64>()? as usize;
        let mut mapping = BTreeMap::new();
        for _ in 0..count {
            let name = self.get_string()?;
            let value = self.get::<T>()?;
            mapping.insert(name, value);
        }
        Ok(mapping)
    }

    /// 剩余未读字节数
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// 是否已读完
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> MhResult<&[u8]> {
        if self.remaining() < n {
            return Err(MhError::buffer_underflow(n, self.remaining()));
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }
}

impl From<SendBuffer> for RecvBuffer {
    fn from(buffer: SendBuffer) -> Self {
        Self::from_bytes(buffer.into_bytes())
    }
}

impl From<Vec<u8>> for RecvBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}
