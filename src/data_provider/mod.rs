use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{CrawlerError, Result};
use crate::models::record::CompanyProfile;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 内置的行业龙头企业表：(行业, [(名称, 代码, 市值, 主要产品)])
const BUILTIN_COMPANIES: &[(&str, &[(&str, &str, &str, &str)])] = &[
    ("人工智能", &[
        ("科大讯飞", "002230.SZ", "800亿", "语音识别、智能教育"),
        ("寒武纪", "688256.SH", "300亿", "AI芯片、智能计算"),
        ("商汤科技", "00020.HK", "600亿", "计算机视觉、AI平台"),
    ]),
    ("新能源汽车", &[
        ("比亚迪", "002594.SZ", "7000亿", "新能源汽车、动力电池"),
        ("宁德时代", "300750.SZ", "8000亿", "动力电池、储能系统"),
        ("蔚来", "NIO", "2000亿", "智能电动汽车"),
    ]),
    ("半导体", &[
        ("中芯国际", "688981.SH", "4000亿", "晶圆代工、芯片制造"),
        ("韦尔股份", "603501.SH", "1500亿", "图像传感器、模拟芯片"),
        ("北方华创", "002371.SZ", "1200亿", "半导体设备、刻蚀机"),
    ]),
    ("生物医药", &[
        ("恒瑞医药", "600276.SH", "3000亿", "抗肿瘤药、创新药"),
        ("药明康德", "603259.SH", "2500亿", "CRO服务、新药研发"),
        ("迈瑞医疗", "300760.SZ", "3500亿", "医疗器械、生命信息"),
    ]),
    ("5G通信", &[
        ("中兴通讯", "000063.SZ", "1500亿", "通信设备、5G基站"),
        ("烽火通信", "600498.SH", "300亿", "光通信、传输设备"),
        ("紫光股份", "000938.SZ", "800亿", "网络设备、云计算"),
    ]),
    ("云计算", &[
        ("阿里云", "BABA", "20000亿", "云服务、大数据"),
        ("腾讯云", "00700.HK", "30000亿", "云服务、游戏云"),
        ("华为云", "私有", "私有", "云服务、企业级解决方案"),
    ]),
    ("物联网", &[
        ("移远通信", "603236.SH", "200亿", "物联网模组、通信模块"),
        ("广和通", "300638.SZ", "150亿", "无线通信模块、物联网"),
        ("日海智能", "002313.SZ", "100亿", "物联网设备、智能硬件"),
    ]),
    ("区块链", &[
        ("远光软件", "002063.SZ", "100亿", "区块链应用、企业管理软件"),
        ("新湖中宝", "600208.SH", "200亿", "区块链投资、房地产"),
        ("安妮股份", "002235.SZ", "50亿", "区块链版权、数字版权"),
    ]),
    ("氢能源", &[
        ("亿华通", "688339.SH", "200亿", "氢燃料电池、氢能设备"),
        ("潍柴动力", "000338.SZ", "1000亿", "氢能发动机、动力系统"),
        ("美锦能源", "000723.SZ", "300亿", "氢能产业链、焦化业务"),
    ]),
    ("储能技术", &[
        ("阳光电源", "300274.SZ", "1500亿", "光伏逆变器、储能系统"),
        ("科士达", "002518.SZ", "200亿", "UPS电源、储能设备"),
        ("南都电源", "300068.SZ", "150亿", "铅酸电池、储能系统"),
    ]),
    ("机器人", &[
        ("埃斯顿", "002747.SZ", "200亿", "工业机器人、自动化设备"),
        ("新松机器人", "300024.SZ", "100亿", "服务机器人、特种机器人"),
        ("机器人", "300024.SZ", "100亿", "工业机器人、智能制造"),
    ]),
    ("AR/VR", &[
        ("歌尔股份", "002241.SZ", "800亿", "VR设备、声学器件"),
        ("水晶光电", "002273.SZ", "200亿", "光学元件、AR显示"),
        ("联创电子", "002036.SZ", "150亿", "光学镜头、VR显示"),
    ]),
    ("量子计算", &[
        ("国盾量子", "688027.SH", "100亿", "量子通信、量子密钥分发"),
        ("科大国创", "300520.SZ", "50亿", "量子软件、人工智能"),
        ("中科曙光", "603019.SH", "400亿", "高性能计算、量子计算"),
    ]),
    ("基因治疗", &[
        ("华大基因", "300676.SZ", "300亿", "基因测序、精准医疗"),
        ("贝瑞基因", "000710.SZ", "100亿", "基因检测、遗传病诊断"),
        ("达安基因", "002030.SZ", "200亿", "分子诊断、基因检测"),
    ]),
    ("碳中和技术", &[
        ("隆基绿能", "601012.SH", "3000亿", "光伏组件、清洁能源"),
        ("通威股份", "600438.SH", "2000亿", "光伏硅料、水产饲料"),
        ("金风科技", "002202.SZ", "500亿", "风力发电、清洁能源"),
    ]),
    ("芯片设计", &[
        ("兆易创新", "603986.SH", "800亿", "存储芯片、MCU"),
        ("汇顶科技", "603160.SH", "400亿", "指纹识别、触控芯片"),
        ("圣邦股份", "300661.SZ", "300亿", "模拟芯片、电源管理"),
    ]),
    ("自动驾驶", &[
        ("四维图新", "002405.SZ", "200亿", "高精地图、自动驾驶"),
        ("德赛西威", "002920.SZ", "300亿", "汽车电子、智能驾驶"),
        ("中科创达", "300496.SZ", "400亿", "智能操作系统、自动驾驶"),
    ]),
    ("智能制造", &[
        ("汇川技术", "300124.SZ", "1500亿", "工业自动化、智能制造"),
        ("信捷电气", "603416.SH", "100亿", "PLC、伺服系统"),
        ("英威腾", "002334.SZ", "100亿", "变频器、工业自动化"),
    ]),
    ("数字孪生", &[
        ("用友网络", "600588.SH", "800亿", "企业管理软件、数字孪生"),
        ("广联达", "002410.SZ", "400亿", "建筑信息化、数字孪生"),
        ("宝信软件", "600845.SH", "300亿", "工业软件、智能制造"),
    ]),
    ("边缘计算", &[
        ("浪潮信息", "000977.SZ", "500亿", "服务器、边缘计算"),
        ("中科曙光", "603019.SH", "400亿", "高性能计算、边缘计算"),
        ("紫光股份", "000938.SZ", "800亿", "网络设备、边缘计算"),
    ]),
];

/// 一个行业及其龙头企业
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryCompanies {
    pub industry: String,
    pub companies: Vec<CompanyProfile>,
}

/// 行业-公司参考数据的访问入口
pub struct CompanyDirectory {
    data: Vec<IndustryCompanies>,
    // 索引用于快速查找
    industry_index: HashMap<String, usize>,
    code_index: HashMap<String, Vec<(usize, usize)>>,
}

impl CompanyDirectory {
    /// 使用内置的公司表
    pub fn builtin() -> Self {
        let data = BUILTIN_COMPANIES
            .iter()
            .map(|(industry, companies)| IndustryCompanies {
                industry: industry.to_string(),
                companies: companies
                    .iter()
                    .map(|(name, code, market_cap, main_products)| CompanyProfile {
                        name: name.to_string(),
                        code: code.to_string(),
                        market_cap: market_cap.to_string(),
                        main_products: main_products.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self::new_with_data(data)
    }

    /// 使用提供的数据创建实例
    pub fn new_with_data(data: Vec<IndustryCompanies>) -> Self {
        let mut directory = Self {
            data,
            industry_index: HashMap::new(),
            code_index: HashMap::new(),
        };

        directory.rebuild_indices();

        directory
    }

    /// 从JSON文件加载公司表
    pub fn load_from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(CrawlerError::Config(format!("Company table not found: {}", path)));
        }

        let text = fs::read_to_string(path)?;
        let data: Vec<IndustryCompanies> = serde_json::from_str(&text)?;
        info!("Loaded {} industries from {}", data.len(), path);

        Ok(Self::new_with_data(data))
    }

    /// 保存公司表到JSON文件
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// 按表中顺序返回所有行业
    pub fn industries(&self) -> Vec<&str> {
        self.data.iter().map(|entry| entry.industry.as_str()).collect()
    }

    pub fn contains(&self, industry: &str) -> bool {
        self.industry_index.contains_key(industry)
    }

    /// 获取指定行业的公司
    pub fn get_companies(&self, industry: &str) -> Option<&[CompanyProfile]> {
        self.industry_index
            .get(industry)
            .map(|&idx| self.data[idx].companies.as_slice())
    }

    /// 按股票代码查找，同一代码可能出现在多个行业中
    pub fn find_by_code(&self, code: &str) -> Vec<(&str, &CompanyProfile)> {
        self.code_index
            .get(code)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&(i, j)| (self.data[i].industry.as_str(), &self.data[i].companies[j]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn company_count(&self) -> usize {
        self.data.iter().map(|entry| entry.companies.len()).sum()
    }

    pub fn entries(&self) -> &[IndustryCompanies] {
        &self.data
    }

    /// 重建索引
    fn rebuild_indices(&mut self) {
        self.industry_index.clear();
        self.code_index.clear();

        for (i, entry) in self.data.iter().enumerate() {
            self.industry_index.insert(entry.industry.clone(), i);

            for (j, company) in entry.companies.iter().enumerate() {
                self.code_index
                    .entry(company.code.clone())
                    .or_insert_with(Vec::new)
                    .push((i, j));
            }
        }
    }
}

impl Default for CompanyDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EMERGING_INDUSTRIES;
    use tempfile::TempDir;

    #[test]
    fn builtin_covers_every_default_industry() {
        let directory = CompanyDirectory::builtin();
        assert_eq!(directory.industries(), EMERGING_INDUSTRIES.to_vec());
        for industry in EMERGING_INDUSTRIES {
            assert_eq!(directory.get_companies(industry).map(|c| c.len()), Some(3));
        }
        assert_eq!(directory.company_count(), 60);
    }

    #[test]
    fn finds_codes_listed_in_several_industries() {
        let directory = CompanyDirectory::builtin();
        let hits = directory.find_by_code("603019.SH");
        let industries: Vec<&str> = hits.iter().map(|(industry, _)| *industry).collect();
        assert_eq!(industries, vec!["量子计算", "边缘计算"]);
        assert!(directory.find_by_code("000000.SZ").is_empty());
    }

    #[test]
    fn unknown_industry_has_no_companies() {
        let directory = CompanyDirectory::builtin();
        assert!(directory.get_companies("元宇宙").is_none());
        assert!(!directory.contains("元宇宙"));
    }

    #[test]
    fn round_trips_through_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("companies.json");
        let path = path.to_str().unwrap();

        let data = vec![IndustryCompanies {
            industry: "人工智能".to_string(),
            companies: CompanyDirectory::builtin().get_companies("人工智能").unwrap().to_vec(),
        }];
        CompanyDirectory::new_with_data(data.clone()).save_to_file(path).unwrap();

        let loaded = CompanyDirectory::load_from_file(path).unwrap();
        assert_eq!(loaded.entries(), data.as_slice());
        assert_eq!(loaded.find_by_code("688256.SH")[0].1.name, "寒武纪");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = CompanyDirectory::load_from_file("/nonexistent/companies.json");
        assert!(matches!(result, Err(CrawlerError::Config(_))));
    }
}
